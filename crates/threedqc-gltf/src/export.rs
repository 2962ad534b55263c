//! Report serializers

use threedqc_core::Report;

const CSV_HEADER: [&str; 6] = [
    "Name",
    "Tested",
    "Pass",
    "Message",
    "Component Message",
    "Guidelines URL",
];

pub fn to_json(report: &Report) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

/// RFC 4180 style: fields containing a comma, quote or line break are quoted.
pub fn to_csv(report: &Report) -> String {
    let mut out = String::new();
    push_row(&mut out, CSV_HEADER.iter().copied());
    for item in report.items() {
        let tested = item.tested.to_string();
        let pass = item.pass.to_string();
        push_row(
            &mut out,
            [
                item.name.as_str(),
                tested.as_str(),
                pass.as_str(),
                item.message.as_str(),
                item.component_message.as_str(),
                item.guidelines_url.as_str(),
            ]
            .into_iter(),
        );
    }
    out
}

fn push_row<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    for (i, field) in fields.enumerate() {
        if i > 0 {
            out.push(',');
        }
        if field.contains([',', '"', '\n', '\r']) {
            out.push('"');
            out.push_str(&field.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(field);
        }
    }
    out.push_str("\r\n");
}

#[cfg(test)]
mod tests {
    use threedqc_core::ReportItem;

    use super::*;

    fn report() -> Report {
        Report {
            items: vec![ReportItem {
                name: "File Size".to_string(),
                tested: true,
                pass: false,
                message: "6.0 KB (allowed: at most 5)".to_string(),
                component_message: "said \"too big\"".to_string(),
                guidelines_url: String::new(),
            }],
        }
    }

    #[test]
    fn csv_quotes_only_when_needed() {
        let csv = to_csv(&report());
        let lines: Vec<_> = csv.split("\r\n").collect();
        assert_eq!(lines[0], "Name,Tested,Pass,Message,Component Message,Guidelines URL");
        assert_eq!(
            lines[1],
            r#"File Size,true,false,6.0 KB (allowed: at most 5),"said ""too big""","#
        );
    }

    #[test]
    fn json_uses_camel_case_fields() {
        let value: serde_json::Value = serde_json::from_str(&to_json(&report()).unwrap()).unwrap();
        assert_eq!(value["items"][0]["componentMessage"], "said \"too big\"");
    }
}
