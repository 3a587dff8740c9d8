//! XMLSERVICE call documents
//!
//! Requests are plain `<xmlservice>` documents with one `<pgm>` element per
//! call. The gateway answers with the same document, outputs filled in, plus
//! `<success>` or `<error>` markers.

use crate::toolkit::output::{CallOutput, OutputMap, OutputNode};
use crate::toolkit::params::{DataParam, Param, ProcedureCall};
use crate::toolkit::ToolkitError;
use roxmltree::{Document, Node};
use std::fmt::Write;

const RETURN_VAR: &str = "return";

/// Escape text for an XML 1.0 document
///
/// Control characters XML 1.0 cannot carry are dropped.
fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&apos;"),
            '"' => out.push_str("&quot;"),
            '\t' | '\n' | '\r' => out.push(ch),
            c if c < '\u{20}' => {}
            _ => out.push(ch),
        }
    }
    out
}

fn write_data(out: &mut String, data: &DataParam) -> Result<(), ToolkitError> {
    let text = data.kind.render(&data.name, &data.value)?;
    // writing to a String cannot fail
    let _ = writeln!(
        out,
        "<data var='{}' type='{}'>{}</data>",
        escape(&data.name),
        data.kind,
        escape(&text)
    );
    Ok(())
}

/// Serialize a call into an XMLSERVICE request document
pub fn build_request(call: &ProcedureCall, library: &str) -> Result<String, ToolkitError> {
    let mut out = String::with_capacity(256 + call.params.len() * 64);
    out.push_str("<?xml version='1.0'?>\n<xmlservice>\n");
    let _ = writeln!(
        out,
        "<pgm name='{}' lib='{}' func='{}' var='{}'>",
        escape(&call.program),
        escape(library),
        escape(&call.procedure),
        escape(&call.procedure)
    );

    for (index, param) in call.params.iter().enumerate() {
        let _ = writeln!(
            out,
            "<parm io='{}' var='p{}'>",
            param.direction(),
            index + 1
        );
        match param {
            Param::Data(data) => write_data(&mut out, data)?,
            Param::Struct(ds) => {
                match ds.dim {
                    Some(dim) => {
                        let _ = writeln!(out, "<ds var='{}' dim='{}'>", escape(&ds.name), dim);
                    }
                    None => {
                        let _ = writeln!(out, "<ds var='{}'>", escape(&ds.name));
                    }
                }
                for field in &ds.fields {
                    write_data(&mut out, field)?;
                }
                out.push_str("</ds>\n");
            }
        }
        out.push_str("</parm>\n");
    }

    if let Some(kind) = call.returns {
        let _ = writeln!(
            out,
            "<return><data var='{}' type='{}'>0</data></return>",
            RETURN_VAR, kind
        );
    }

    out.push_str("</pgm>\n</xmlservice>\n");
    Ok(out)
}

fn var_name<'a>(node: &Node<'a, '_>) -> Option<&'a str> {
    node.attribute("var")
}

fn data_text(node: &Node) -> String {
    node.text().unwrap_or_default().to_string()
}

fn read_struct(node: &Node) -> OutputMap {
    let mut map = OutputMap::new();
    for child in node.children().filter(|n| n.has_tag_name("data")) {
        if let Some(name) = var_name(&child) {
            map.insert(name, OutputNode::Data(data_text(&child)));
        }
    }
    map
}

fn read_into(call: &ProcedureCall, node: &Node, values: &mut OutputMap) {
    for child in node.children().filter(Node::is_element) {
        let Some(name) = var_name(&child) else {
            continue;
        };
        match child.tag_name().name() {
            "data" => values.insert(name, OutputNode::Data(data_text(&child))),
            "ds" if call.dim_of(name).is_some() || child.attribute("dim").is_some() => {
                values.push_row(name, read_struct(&child));
            }
            "ds" => values.insert(name, OutputNode::Struct(read_struct(&child))),
            _ => {}
        }
    }
}

/// Collect the gateway's error text, if the reply reports one
fn find_error(root: &Node) -> Option<String> {
    let error = root.descendants().find(|n| n.has_tag_name("error"))?;

    let message = error
        .descendants()
        .filter(|n| n.has_tag_name("xmlerrmsg") || n.has_tag_name("errmsg"))
        .filter_map(|n| n.text())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("; ");

    if !message.is_empty() {
        return Some(message);
    }

    let text = error
        .descendants()
        .filter_map(|n| n.text())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    Some(if text.is_empty() { "unknown error".to_string() } else { text })
}

/// Parse the gateway's reply for `call` into a nested result
pub fn parse_response(call: &ProcedureCall, xml: &str) -> Result<CallOutput, ToolkitError> {
    let doc = Document::parse(xml).map_err(|e| ToolkitError::Xml(e.to_string()))?;
    let root = doc.root_element();

    if let Some(message) = find_error(&root) {
        return Err(ToolkitError::Remote(message));
    }

    let pgm = root
        .descendants()
        .find(|n| {
            n.has_tag_name("pgm")
                && n.attribute("func")
                    .map_or(true, |f| f.eq_ignore_ascii_case(&call.procedure))
        })
        .ok_or_else(|| {
            ToolkitError::Xml(format!("reply has no result for {}", call.procedure))
        })?;

    let mut output = CallOutput::new(call.procedure.clone());
    for child in pgm.children().filter(Node::is_element) {
        match child.tag_name().name() {
            "parm" | "return" => read_into(call, &child, &mut output.values),
            _ => {}
        }
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Amount;
    use crate::toolkit::params::{DataParam, Direction, ParamType, StructParam};

    fn list_call() -> ProcedureCall {
        ProcedureCall::new("VEHCRUD", "ListVehicles")
            .param(
                StructParam::new("ResultArray", Direction::Out)
                    .dim(999)
                    .out("VehicleId", ParamType::int())
                    .out("Make", ParamType::chars(50)),
            )
            .param(DataParam::output("ResultCount", ParamType::int()))
    }

    #[test]
    fn test_build_request_layout() {
        let call = ProcedureCall::new("VEHCRUD", "AddVehicle")
            .param(
                StructParam::new("VehicleData", Direction::In)
                    .with("Make", ParamType::chars(50), "Dodge & Sons")
                    .with("AskingPrice", ParamType::packed(10, 2), Amount::from_cents(99900)),
            )
            .param(DataParam::input("UserId", ParamType::chars(10), "WEBUSER"))
            .returns(ParamType::int());

        let xml = build_request(&call, "USEDCAR").unwrap();

        assert!(xml.contains("<pgm name='VEHCRUD' lib='USEDCAR' func='AddVehicle' var='AddVehicle'>"));
        assert!(xml.contains("<parm io='in' var='p1'>\n<ds var='VehicleData'>"));
        assert!(xml.contains("<data var='Make' type='50A'>Dodge &amp; Sons</data>"));
        assert!(xml.contains("<data var='AskingPrice' type='10p2'>999.00</data>"));
        assert!(xml.contains("<parm io='in' var='p2'>\n<data var='UserId' type='10A'>WEBUSER</data>"));
        assert!(xml.contains("<return><data var='return' type='10i0'>0</data></return>"));

        // the request must itself be well-formed
        assert!(Document::parse(&xml).is_ok());
    }

    #[test]
    fn test_build_request_drops_illegal_control_chars() {
        let call = ProcedureCall::new("VEHCRUD", "UpdateVehicleStatus")
            .param(DataParam::input(
                "Notes",
                ParamType::chars(1000),
                "Paid\u{0}\u{8} cash\u{b}\u{1f}\tin full\n",
            ));

        let xml = build_request(&call, "USEDCAR").unwrap();

        assert!(xml.contains("<data var='Notes' type='1000A'>Paid cash\tin full\n</data>"));
        assert!(Document::parse(&xml).is_ok());
    }

    #[test]
    fn test_build_request_rejects_oversized_numbers() {
        let call = ProcedureCall::new("VEHBIZ", "CalculatePriceAdjustment")
            .param(DataParam::input("DaysThreshold", ParamType::int(), i64::MAX));
        assert!(matches!(
            build_request(&call, "USEDCAR"),
            Err(ToolkitError::InvalidParam { .. })
        ));
    }

    #[test]
    fn test_parse_array_reply() {
        let reply = r#"<?xml version='1.0'?>
<xmlservice>
<pgm name='VEHCRUD' lib='USEDCAR' func='ListVehicles'>
<parm io='out' var='p1'>
<ds var='ResultArray' dim='999'>
<data var='VehicleId' type='10i0'>1</data>
<data var='Make' type='50A'>Honda    </data>
</ds>
<ds var='ResultArray' dim='999'>
<data var='VehicleId' type='10i0'>2</data>
<data var='Make' type='50A'>Mazda</data>
</ds>
</parm>
<parm io='out' var='p2'>
<data var='ResultCount' type='10i0'>2</data>
</parm>
<success><![CDATA[+++ success VEHCRUD ListVehicles]]></success>
</pgm>
</xmlservice>"#;

        let output = parse_response(&list_call(), reply).unwrap();
        assert_eq!(output.procedure, "ListVehicles");
        assert_eq!(output.values.int("ResultCount"), Some(2));

        let rows = output.values.rows("ResultArray");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].text("Make"), Some("Honda"));
        assert_eq!(rows[1].int("VehicleId"), Some(2));
    }

    #[test]
    fn test_parse_return_value() {
        let call = ProcedureCall::new("VEHCRUD", "DeleteVehicle").returns(ParamType::int());
        let reply = "<xmlservice><pgm name='VEHCRUD' func='DeleteVehicle'>\
                     <return><data var='return' type='10i0'>-3</data></return>\
                     </pgm></xmlservice>";
        let output = parse_response(&call, reply).unwrap();
        assert_eq!(output.return_code(), Some(-3));
    }

    #[test]
    fn test_parse_reports_remote_error() {
        let reply = "<xmlservice><pgm name='VEHCRUD' func='ListVehicles'>\
                     <error><errnoxml>1100016</errnoxml>\
                     <xmlerrmsg><![CDATA[XML run pgm failed]]></xmlerrmsg></error>\
                     </pgm></xmlservice>";
        match parse_response(&list_call(), reply) {
            Err(ToolkitError::Remote(msg)) => assert_eq!(msg, "XML run pgm failed"),
            other => panic!("expected remote error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_malformed_reply() {
        assert!(matches!(
            parse_response(&list_call(), "<xmlservice><pgm>"),
            Err(ToolkitError::Xml(_))
        ));
        assert!(matches!(
            parse_response(&list_call(), "<xmlservice/>"),
            Err(ToolkitError::Xml(_))
        ));
    }
}
