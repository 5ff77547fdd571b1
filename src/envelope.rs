//! SOAP envelope carrying ADS commands to the web service.
//!
//! The TcAdsWebService exposes a single `ReadWrite` operation. The binary
//! command travels base64-encoded in `pwrData`; the reply comes back
//! base64-encoded in `ppRdData`, or as an `errorcode` element when the
//! controller rejects the request.
//!
//! # Request Fields
//!
//! | Element | XSD type | Content |
//! |---------|----------|---------|
//! | `netId` | string | AMS Net Id of the target |
//! | `nPort` | int | ADS port of the target |
//! | `indexGroup` | unsignedInt | operation class |
//! | `indexOffset` | unsignedInt | operation parameter |
//! | `cbRdLen` | int | bytes requested back |
//! | `pwrData` | base64Binary | binary command |
//!
//! # Example
//!
//! ```
//! use ads_webservice::envelope::{decode_reply, encode_request};
//! use ads_webservice::{AdsRequest, AmsAddr, AmsNetId};
//!
//! let target = AmsAddr::new(AmsNetId::new([5, 1, 2, 3, 1, 1]), 851);
//! let request = AdsRequest {
//!     index_group: 0xF080,
//!     index_offset: 1,
//!     read_length: 6,
//!     payload: vec![1, 2, 3],
//! };
//! let body = encode_request(&target, &request);
//! assert!(body.contains("<pwrData xsi:type=\"xsd:base64Binary\">AQID</pwrData>"));
//!
//! let reply = decode_reply("<Envelope><Body><ppRdData>AQID</ppRdData></Body></Envelope>").unwrap();
//! assert_eq!(reply.data, vec![1, 2, 3]);
//! ```

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::address::AmsAddr;
use crate::command::AdsRequest;
use crate::error::{AdsError, Result};
use crate::response::AdsResponse;

/// Namespace of the `ReadWrite` operation.
pub const MESSAGE_NAMESPACE: &str = "http://beckhoff.org/message/";

/// Builds the SOAP request body for one ADS transaction.
pub fn encode_request(target: &AmsAddr, request: &AdsRequest) -> String {
    let data = STANDARD.encode(&request.payload);
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            r#"<SOAP-ENV:Envelope xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance/" "#,
            r#"xmlns:xsd="http://www.w3.org/2001/XMLSchema/" "#,
            r#"xmlns:SOAP-ENV="http://schemas.xmlsoap.org/soap/envelope/" "#,
            r#"SOAP-ENV:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/">"#,
            r#"<SOAP-ENV:Body><q1:ReadWrite xmlns:q1="{ns}">"#,
            r#"<netId xsi:type="xsd:string">{net_id}</netId>"#,
            r#"<nPort xsi:type="xsd:int">{port}</nPort>"#,
            r#"<indexGroup xsi:type="xsd:unsignedInt">{group}</indexGroup>"#,
            r#"<indexOffset xsi:type="xsd:unsignedInt">{offset}</indexOffset>"#,
            r#"<cbRdLen xsi:type="xsd:int">{read_len}</cbRdLen>"#,
            r#"<pwrData xsi:type="xsd:base64Binary">{data}</pwrData>"#,
            r#"</q1:ReadWrite></SOAP-ENV:Body></SOAP-ENV:Envelope>"#,
        ),
        ns = MESSAGE_NAMESPACE,
        net_id = target.net_id,
        port = target.port,
        group = request.index_group,
        offset = request.index_offset,
        read_len = request.read_length,
        data = data,
    )
}

#[derive(Clone, Copy)]
enum Field {
    ErrorCode,
    ReadData,
}

/// Parses a SOAP reply.
///
/// Elements are matched by local name, so any namespace prefix is accepted.
/// A reply with neither `errorcode` nor `ppRdData` yields an empty payload.
///
/// # Errors
///
/// - `AdsError::Protocol` if the reply carries an `errorcode`
/// - `AdsError::InvalidResponse` if the XML, the code or the base64 is malformed
pub fn decode_reply(xml: &str) -> Result<AdsResponse> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut current: Option<Field> = None;
    let mut error_code: Option<String> = None;
    let mut read_data: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                current = match e.local_name().as_ref() {
                    b"errorcode" => Some(Field::ErrorCode),
                    b"ppRdData" => Some(Field::ReadData),
                    _ => None,
                };
            }
            Ok(Event::Text(text)) => {
                if let Some(field) = current {
                    let text = text
                        .unescape()
                        .map_err(|e| AdsError::invalid_response(format!("bad reply text: {e}")))?;
                    let slot = match field {
                        Field::ErrorCode => &mut error_code,
                        Field::ReadData => &mut read_data,
                    };
                    slot.get_or_insert_with(String::new).push_str(&text);
                }
            }
            Ok(Event::End(_)) => current = None,
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(AdsError::invalid_response(format!(
                    "malformed reply XML at byte {}: {e}",
                    reader.buffer_position()
                )))
            }
            Ok(_) => {}
        }
    }

    if let Some(code) = error_code {
        let code = code.trim();
        let code: u32 = code
            .parse()
            .map_err(|_| AdsError::invalid_response(format!("errorcode '{code}' is not a number")))?;
        return Err(AdsError::protocol(code));
    }

    match read_data {
        Some(encoded) => {
            let cleaned: String = encoded.split_whitespace().collect();
            let data = STANDARD
                .decode(cleaned.as_bytes())
                .map_err(|e| AdsError::invalid_response(format!("bad ppRdData: {e}")))?;
            Ok(AdsResponse::new(data))
        }
        None => Ok(AdsResponse::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::AmsNetId;

    fn target() -> AmsAddr {
        AmsAddr::new(AmsNetId::new([5, 1, 204, 160, 1, 1]), 851)
    }

    #[test]
    fn test_request_contains_all_fields() {
        let request = AdsRequest {
            index_group: 61570,
            index_offset: 2,
            read_length: 24,
            payload: vec![0xFF, 0x00],
        };
        let body = encode_request(&target(), &request);

        assert!(body.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(body.contains("<q1:ReadWrite xmlns:q1=\"http://beckhoff.org/message/\">"));
        assert!(body.contains("<netId xsi:type=\"xsd:string\">5.1.204.160.1.1</netId>"));
        assert!(body.contains("<nPort xsi:type=\"xsd:int\">851</nPort>"));
        assert!(body.contains("<indexGroup xsi:type=\"xsd:unsignedInt\">61570</indexGroup>"));
        assert!(body.contains("<indexOffset xsi:type=\"xsd:unsignedInt\">2</indexOffset>"));
        assert!(body.contains("<cbRdLen xsi:type=\"xsd:int\">24</cbRdLen>"));
        assert!(body.contains("<pwrData xsi:type=\"xsd:base64Binary\">/wA=</pwrData>"));
        assert!(body.ends_with("</SOAP-ENV:Envelope>"));
    }

    #[test]
    fn test_request_is_well_formed() {
        let request = AdsRequest {
            index_group: 1,
            index_offset: 2,
            read_length: 3,
            payload: vec![],
        };
        let body = encode_request(&target(), &request);
        let mut reader = Reader::from_str(&body);
        loop {
            match reader.read_event() {
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => panic!("request XML is malformed: {e}"),
            }
        }
    }

    #[test]
    fn test_decode_payload_with_namespaces() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
            <soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
              <soap:Body>
                <ns1:ReadWriteResponse xmlns:ns1="http://beckhoff.org/message/">
                  <ppRdData>AAAAAAQAAAAHAAAA</ppRdData>
                </ns1:ReadWriteResponse>
              </soap:Body>
            </soap:Envelope>"#;
        let reply = decode_reply(xml).unwrap();
        assert_eq!(reply.data, vec![0, 0, 0, 0, 4, 0, 0, 0, 7, 0, 0, 0]);
    }

    #[test]
    fn test_decode_payload_with_line_breaks() {
        let xml = "<r><ppRdData>AQID\n  BAU=</ppRdData></r>";
        assert_eq!(decode_reply(xml).unwrap().data, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_decode_errorcode() {
        let xml = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
              <soap:Body><soap:Fault>
                <faultcode>soap:Server</faultcode>
                <faultstring>ADS error</faultstring>
                <detail><ns1:TcAdsFault xmlns:ns1="http://beckhoff.org">
                  <ns1:errorcode>1808</ns1:errorcode>
                </ns1:TcAdsFault></detail>
              </soap:Fault></soap:Body></soap:Envelope>"#;
        let err = decode_reply(xml).unwrap_err();
        assert_eq!(err.fault().map(|f| f.code()), Some(1808));
    }

    #[test]
    fn test_errorcode_wins_over_payload() {
        let xml = "<r><ppRdData>AQID</ppRdData><errorcode>1794</errorcode></r>";
        assert_eq!(
            decode_reply(xml).unwrap_err().fault().map(|f| f.code()),
            Some(1794)
        );
    }

    #[test]
    fn test_decode_missing_payload_is_empty() {
        let reply = decode_reply("<r><ReadWriteResponse/></r>").unwrap();
        assert!(reply.is_empty());
    }

    #[test]
    fn test_decode_bad_base64() {
        let err = decode_reply("<r><ppRdData>@@@</ppRdData></r>").unwrap_err();
        assert!(matches!(err, AdsError::InvalidResponse { .. }));
    }

    #[test]
    fn test_decode_bad_errorcode() {
        let err = decode_reply("<r><errorcode>oops</errorcode></r>").unwrap_err();
        assert!(matches!(err, AdsError::InvalidResponse { .. }));
    }

    #[test]
    fn test_decode_malformed_xml() {
        let err = decode_reply("<r><ppRdData>AQID</wrong></r>").unwrap_err();
        assert!(matches!(err, AdsError::InvalidResponse { .. }));
    }
}
