//! HTML pages. Every interpolated value goes through [`escape`].

use crate::app::listings::{AmenityView, PlaceView, StateView};

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<HTML lang=\"en\">\n<HEAD>\n<TITLE>{}</TITLE>\n</HEAD>\n<BODY>\n{}</BODY>\n</HTML>\n",
        escape(title),
        body
    )
}

fn state_item(state: &StateView) -> String {
    format!(
        "<LI>{}: <B>{}</B></LI>\n",
        escape(&state.id),
        escape(&state.name)
    )
}

fn state_with_cities_item(state: &StateView) -> String {
    let mut out = format!("<LI>{}: <B>{}</B>\n<UL>\n", escape(&state.id), escape(&state.name));
    for city in &state.cities {
        out.push_str(&format!("<LI>{}: <B>{}</B></LI>\n", escape(&city.id), escape(&city.name)));
    }
    out.push_str("</UL>\n</LI>\n");
    out
}

pub fn error_page(message: &str) -> String {
    page("HBNB", &format!("<H1>{}</H1>\n", escape(message)))
}

pub fn number_page(n: u64) -> String {
    page("HBNB", &format!("<H1>Number: {}</H1>\n", n))
}

pub fn odd_or_even_page(n: u64) -> String {
    let parity = if n % 2 == 0 { "even" } else { "odd" };
    page("HBNB", &format!("<H1>Number: {} is {}</H1>\n", n, parity))
}

pub fn states_list_page(states: &[StateView]) -> String {
    let mut body = String::from("<H1>States</H1>\n<UL>\n");
    for state in states {
        body.push_str(&state_item(state));
    }
    body.push_str("</UL>\n");
    page("HBNB", &body)
}

pub fn cities_by_states_page(states: &[StateView]) -> String {
    let mut body = String::from("<H1>States</H1>\n<UL>\n");
    for state in states {
        body.push_str(&state_with_cities_item(state));
    }
    body.push_str("</UL>\n");
    page("HBNB", &body)
}

/// One state with its cities, or "Not found!" when the id matched nothing.
pub fn state_page(state: Option<&StateView>) -> String {
    let Some(state) = state else {
        return page("HBNB", "<H1>Not found!</H1>\n");
    };
    let mut body = format!(
        "<H1>State: {}</H1>\n<H3>Cities:</H3>\n<UL>\n",
        escape(&state.name)
    );
    for city in &state.cities {
        body.push_str(&format!("<LI>{}: <B>{}</B></LI>\n", escape(&city.id), escape(&city.name)));
    }
    body.push_str("</UL>\n");
    page("HBNB", &body)
}

fn filters_section(states: &[StateView], amenities: &[AmenityView]) -> String {
    let mut out = String::from(
        "<SECTION class=\"filters\">\n<DIV class=\"locations\">\n<H3>States</H3>\n<UL class=\"popover\">\n",
    );
    for state in states {
        out.push_str(&format!("<LI><H2>{}</H2>\n<UL>\n", escape(&state.name)));
        for city in &state.cities {
            out.push_str(&format!("<LI>{}</LI>\n", escape(&city.name)));
        }
        out.push_str("</UL>\n</LI>\n");
    }
    out.push_str("</UL>\n</DIV>\n<DIV class=\"amenities\">\n<H3>Amenities</H3>\n<UL class=\"popover\">\n");
    for amenity in amenities {
        out.push_str(&format!("<LI>{}</LI>\n", escape(&amenity.name)));
    }
    out.push_str("</UL>\n</DIV>\n<BUTTON>Search</BUTTON>\n</SECTION>\n");
    out
}

pub fn filters_page(states: &[StateView], amenities: &[AmenityView]) -> String {
    page("AirBnB clone", &filters_section(states, amenities))
}

fn place_article(place: &PlaceView) -> String {
    let plural = |n: i64, word: &str| {
        if n == 1 {
            format!("{} {}", n, word)
        } else {
            format!("{} {}s", n, word)
        }
    };
    format!(
        "<ARTICLE>\n<DIV class=\"title_box\">\n<H2>{}</H2>\n<DIV class=\"price_by_night\">${}</DIV>\n</DIV>\n\
         <DIV class=\"information\">\n<DIV class=\"max_guest\">{}</DIV>\n\
         <DIV class=\"number_rooms\">{}</DIV>\n<DIV class=\"number_bathrooms\">{}</DIV>\n</DIV>\n\
         <DIV class=\"user\"><B>Owner:</B> {}</DIV>\n<DIV class=\"description\">{}</DIV>\n</ARTICLE>\n",
        escape(&place.name),
        place.price,
        plural(place.max_guests, "Guest"),
        plural(place.rooms, "Bedroom"),
        plural(place.bathrooms, "Bathroom"),
        escape(&place.owner),
        escape(&place.description),
    )
}

pub fn hbnb_page(states: &[StateView], amenities: &[AmenityView], places: &[PlaceView]) -> String {
    let mut body = filters_section(states, amenities);
    body.push_str("<SECTION class=\"places\">\n<H1>Places</H1>\n");
    for place in places {
        body.push_str(&place_article(place));
    }
    body.push_str("</SECTION>\n");
    page("AirBnB clone", &body)
}
