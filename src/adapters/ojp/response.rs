//! OJP 1.0 `OJPTripDelivery` parsing.
//!
//! Walks the document as a stream and keeps the element path relative to the
//! enclosing `TimedLeg`. Namespaces are ignored; only local names matter.
//! Missing fields keep the `Unknown` sentinel and malformed XML ends the walk
//! early with whatever was complete, so this never fails.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::domain::transit::{format_service_time, Itinerary, Leg, UNKNOWN};

#[derive(Debug, Clone, Copy)]
enum LegField {
    BoardingStop,
    BoardingTime,
    AlightingStop,
    AlightingTime,
    LineName,
    Headsign,
}

fn leg_field(relative_path: &[&str]) -> Option<LegField> {
    match relative_path {
        ["LegBoard", "StopPointName", "Text"] => Some(LegField::BoardingStop),
        ["LegBoard", "ServiceDeparture", "TimetabledTime"] => Some(LegField::BoardingTime),
        ["LegAlight", "StopPointName", "Text"] => Some(LegField::AlightingStop),
        ["LegAlight", "ServiceArrival", "TimetabledTime"] => Some(LegField::AlightingTime),
        ["Service", "PublishedLineName", "Text"] => Some(LegField::LineName),
        ["Service", "DestinationText", "Text"] => Some(LegField::Headsign),
        _ => None,
    }
}

/// First non-empty match wins; later duplicates are ignored.
fn set_field(leg: &mut Leg, field: LegField, text: &str) {
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    let (slot, value) = match field {
        LegField::BoardingStop => (&mut leg.boarding_stop, text.to_string()),
        LegField::BoardingTime => (&mut leg.boarding_time, format_service_time(text)),
        LegField::AlightingStop => (&mut leg.alighting_stop, text.to_string()),
        LegField::AlightingTime => (&mut leg.alighting_time, format_service_time(text)),
        LegField::LineName => (&mut leg.line_name, text.to_string()),
        LegField::Headsign => (&mut leg.headsign, text.to_string()),
    };
    if slot.as_str() == UNKNOWN {
        *slot = value;
    }
}

#[derive(Default)]
struct TripWalker {
    path: Vec<String>,
    itineraries: Vec<Itinerary>,
    trip: Option<Itinerary>,
    leg: Option<(usize, Leg)>,
}

impl TripWalker {
    fn start(&mut self, name: String) {
        match name.as_str() {
            "Trip" if self.trip.is_none() => self.trip = Some(Itinerary::default()),
            "TimedLeg" if self.trip.is_some() && self.leg.is_none() => {
                self.leg = Some((self.path.len() + 1, Leg::default()))
            }
            _ => {}
        }
        self.path.push(name);
    }

    fn end(&mut self) {
        let Some(name) = self.path.pop() else {
            return;
        };
        match name.as_str() {
            "TimedLeg" => {
                if let (Some((depth, leg)), Some(trip)) = (self.leg.take(), self.trip.as_mut()) {
                    debug_assert_eq!(depth, self.path.len() + 1);
                    trip.legs.push(leg);
                }
            }
            "Trip" if self.leg.is_none() => {
                if let Some(trip) = self.trip.take() {
                    self.itineraries.push(trip);
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        let Some((depth, leg)) = self.leg.as_mut() else {
            return;
        };
        let relative: Vec<&str> = self.path[*depth..].iter().map(String::as_str).collect();
        if let Some(field) = leg_field(&relative) {
            set_field(leg, field, text);
        }
    }
}

fn local_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

/// Extracts every `Trip` with its `TimedLeg`s, in document order.
pub fn parse_trip_response(xml: &str) -> Vec<Itinerary> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut walker = TripWalker::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => walker.start(local_name(e.local_name().as_ref())),
            Ok(Event::End(_)) => walker.end(),
            Ok(Event::Text(e)) => {
                if let Ok(text) = e.unescape() {
                    walker.text(&text);
                }
            }
            Ok(Event::CData(e)) => {
                walker.text(&String::from_utf8_lossy(&e.into_inner()));
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(
                    position = reader.buffer_position(),
                    error = %e,
                    "Malformed trip response, keeping complete trips"
                );
                break;
            }
        }
    }

    walker.itineraries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::transit::UNKNOWN;

    const TWO_TRIPS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<siri:OJP xmlns:siri="http://www.siri.org.uk/siri" xmlns:ojp="http://www.vdv.de/ojp" version="1.0">
  <siri:OJPResponse>
    <siri:ServiceDelivery>
      <ojp:OJPTripDelivery>
        <ojp:TripResult>
          <ojp:Trip>
            <ojp:TripId>1</ojp:TripId>
            <ojp:TripLeg>
              <ojp:TimedLeg>
                <ojp:LegBoard>
                  <ojp:StopPointName><ojp:Text>Lausanne</ojp:Text></ojp:StopPointName>
                  <ojp:ServiceDeparture><ojp:TimetabledTime>2025-03-01T08:15:00Z</ojp:TimetabledTime></ojp:ServiceDeparture>
                </ojp:LegBoard>
                <ojp:LegIntermediates>
                  <ojp:StopPointName><ojp:Text>Morges</ojp:Text></ojp:StopPointName>
                </ojp:LegIntermediates>
                <ojp:LegAlight>
                  <ojp:StopPointName><ojp:Text>Genève</ojp:Text></ojp:StopPointName>
                  <ojp:ServiceArrival><ojp:TimetabledTime>2025-03-01T08:51:00Z</ojp:TimetabledTime></ojp:ServiceArrival>
                </ojp:LegAlight>
                <ojp:Service>
                  <ojp:PublishedLineName><ojp:Text>IR 15</ojp:Text></ojp:PublishedLineName>
                  <ojp:DestinationText><ojp:Text>Genève-Aéroport</ojp:Text></ojp:DestinationText>
                </ojp:Service>
              </ojp:TimedLeg>
            </ojp:TripLeg>
            <ojp:TripLeg>
              <ojp:TransferLeg><ojp:Duration>PT5M</ojp:Duration></ojp:TransferLeg>
            </ojp:TripLeg>
            <ojp:TripLeg>
              <ojp:TimedLeg>
                <ojp:LegBoard>
                  <ojp:StopPointName><ojp:Text>Genève, gare Cornavin</ojp:Text></ojp:StopPointName>
                </ojp:LegBoard>
                <ojp:Service>
                  <ojp:PublishedLineName><ojp:Text>8</ojp:Text></ojp:PublishedLineName>
                </ojp:Service>
              </ojp:TimedLeg>
            </ojp:TripLeg>
          </ojp:Trip>
        </ojp:TripResult>
        <ojp:TripResult>
          <ojp:Trip>
            <ojp:TripLeg>
              <ojp:TimedLeg>
                <ojp:Service>
                  <ojp:PublishedLineName><ojp:Text>IC 1</ojp:Text></ojp:PublishedLineName>
                </ojp:Service>
              </ojp:TimedLeg>
            </ojp:TripLeg>
          </ojp:Trip>
        </ojp:TripResult>
      </ojp:OJPTripDelivery>
    </siri:ServiceDelivery>
  </siri:OJPResponse>
</siri:OJP>"#;

    #[test]
    fn parses_trips_and_timed_legs_in_order() {
        let trips = parse_trip_response(TWO_TRIPS);
        assert_eq!(trips.len(), 2);
        assert_eq!(trips[0].legs.len(), 2);
        assert_eq!(trips[1].legs.len(), 1);

        let first = &trips[0].legs[0];
        assert_eq!(first.boarding_stop, "Lausanne");
        assert_eq!(first.boarding_time, "01.03.2025 08:15:00");
        assert_eq!(first.alighting_stop, "Genève");
        assert_eq!(first.alighting_time, "01.03.2025 08:51:00");
        assert_eq!(first.line_name, "IR 15");
        assert_eq!(first.headsign, "Genève-Aéroport");
    }

    #[test]
    fn intermediate_stops_do_not_leak_into_leg() {
        let trips = parse_trip_response(TWO_TRIPS);
        assert_ne!(trips[0].legs[0].boarding_stop, "Morges");
        assert_ne!(trips[0].legs[0].alighting_stop, "Morges");
    }

    #[test]
    fn missing_fields_degrade_to_unknown() {
        let trips = parse_trip_response(TWO_TRIPS);
        let second = &trips[0].legs[1];
        assert_eq!(second.boarding_stop, "Genève, gare Cornavin");
        assert_eq!(second.boarding_time, UNKNOWN);
        assert_eq!(second.alighting_stop, UNKNOWN);
        assert_eq!(second.headsign, UNKNOWN);
        assert_eq!(second.line_name, "8");
    }

    #[test]
    fn response_without_trips_is_empty() {
        let xml = r#"<OJP><OJPResponse><ServiceDelivery><OJPTripDelivery/></ServiceDelivery></OJPResponse></OJP>"#;
        assert!(parse_trip_response(xml).is_empty());
    }

    #[test]
    fn malformed_xml_keeps_complete_trips() {
        let truncated = r#"<OJP><Trip><TimedLeg><Service><PublishedLineName><Text>S1</Text></PublishedLineName></Service></TimedLeg></Trip><Trip><TimedLeg></Broken>"#;
        let trips = parse_trip_response(truncated);
        assert_eq!(trips.len(), 1);
        assert_eq!(trips[0].legs[0].line_name, "S1");
    }

    #[test]
    fn garbage_never_panics() {
        assert!(parse_trip_response("not xml at all <<<").is_empty());
        assert!(parse_trip_response("").is_empty());
    }

    #[test]
    fn entities_are_unescaped() {
        let xml = r#"<OJP><Trip><TimedLeg><LegBoard><StopPointName><Text>Aigle &amp; Co</Text></StopPointName></LegBoard></TimedLeg></Trip></OJP>"#;
        let trips = parse_trip_response(xml);
        assert_eq!(trips[0].legs[0].boarding_stop, "Aigle & Co");
    }

    #[test]
    fn repeated_text_keeps_the_first_value() {
        let xml = r#"<OJP><Trip><TimedLeg>
            <LegBoard><StopPointName><Text>Lausanne</Text><Text>Losanna</Text></StopPointName></LegBoard>
            <Service><DestinationText><Text> </Text><Text>Genève-Aéroport</Text><Text>Genf Flughafen</Text></DestinationText></Service>
        </TimedLeg></Trip></OJP>"#;
        let leg = &parse_trip_response(xml)[0].legs[0];
        assert_eq!(leg.boarding_stop, "Lausanne");
        assert_eq!(leg.headsign, "Genève-Aéroport");
    }
}
