//! OJP 1.0 `OJPTripRequest` document.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::ports::{TripRequest, TripServiceError};

pub const SIRI_NAMESPACE: &str = "http://www.siri.org.uk/siri";
pub const OJP_NAMESPACE: &str = "http://www.vdv.de/ojp";

/// Fixed trip parameters sent with every request.
pub const NUMBER_OF_RESULTS: u32 = 10;
pub const OPTIMISATION_METHOD: &str = "fastest";

struct XmlDoc {
    writer: Writer<Vec<u8>>,
}

impl XmlDoc {
    fn new() -> Self {
        Self {
            writer: Writer::new_with_indent(Vec::new(), b' ', 2),
        }
    }

    fn event(&mut self, event: Event<'_>) -> Result<(), TripServiceError> {
        self.writer
            .write_event(event)
            .map_err(|e| TripServiceError::Encoding(e.to_string()))
    }

    fn open(&mut self, name: &str) -> Result<(), TripServiceError> {
        self.event(Event::Start(BytesStart::new(name)))
    }

    fn close(&mut self, name: &str) -> Result<(), TripServiceError> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    /// `<name>text</name>`, with `text` escaped.
    fn leaf(&mut self, name: &str, text: &str) -> Result<(), TripServiceError> {
        self.open(name)?;
        self.event(Event::Text(BytesText::new(text)))?;
        self.close(name)
    }

    fn place_ref(&mut self, stop_id: &str, name: &str) -> Result<(), TripServiceError> {
        self.open("ojp:PlaceRef")?;
        self.leaf("ojp:StopPlaceRef", stop_id)?;
        self.open("ojp:LocationName")?;
        self.leaf("ojp:Text", name)?;
        self.close("ojp:LocationName")?;
        self.close("ojp:PlaceRef")
    }

    fn finish(self) -> Result<String, TripServiceError> {
        String::from_utf8(self.writer.into_inner())
            .map_err(|e| TripServiceError::Encoding(e.to_string()))
    }
}

/// Serializes a trip request for the given requestor reference.
///
/// The departure doubles as request timestamp.
pub fn build_trip_request(
    request: &TripRequest,
    requestor_ref: &str,
) -> Result<String, TripServiceError> {
    let mut doc = XmlDoc::new();

    doc.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    doc.event(Event::Start(BytesStart::new("OJP").with_attributes([
        ("xmlns", SIRI_NAMESPACE),
        ("xmlns:ojp", OJP_NAMESPACE),
        ("version", "1.0"),
    ])))?;
    doc.open("OJPRequest")?;
    doc.open("ServiceRequest")?;
    doc.leaf("RequestTimestamp", &request.departure)?;
    doc.leaf("RequestorRef", requestor_ref)?;

    doc.open("ojp:OJPTripRequest")?;
    doc.leaf("RequestTimestamp", &request.departure)?;

    doc.open("ojp:Origin")?;
    doc.place_ref(request.origin_id.as_str(), &request.origin_name)?;
    doc.leaf("ojp:DepArrTime", &request.departure)?;
    doc.close("ojp:Origin")?;

    doc.open("ojp:Destination")?;
    doc.place_ref(request.destination_id.as_str(), &request.destination_name)?;
    doc.close("ojp:Destination")?;

    doc.open("ojp:Params")?;
    doc.leaf("ojp:NumberOfResults", &NUMBER_OF_RESULTS.to_string())?;
    doc.leaf("ojp:OptimisationMethod", OPTIMISATION_METHOD)?;
    doc.leaf("ojp:IncludeTrackSections", "true")?;
    doc.leaf("ojp:IncludeTurnDescription", "true")?;
    doc.leaf("ojp:IncludeIntermediateStops", "true")?;
    doc.close("ojp:Params")?;

    doc.close("ojp:OJPTripRequest")?;
    doc.close("ServiceRequest")?;
    doc.close("OJPRequest")?;
    doc.close("OJP")?;

    doc.finish()
}
