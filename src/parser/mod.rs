pub mod cards;
pub mod events;

pub use cards::{render_cards, Badge, Card, CardItem, DetailLine, Section, SectionBody};
pub use events::{parse_events, CalendarEvent, EventTime};
