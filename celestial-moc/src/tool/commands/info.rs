use super::{Command, CommandOutput};
use crate::error::MocResult;
use crate::moc::{Moc, MocType};
use crate::tool::{Params, Session};
use serde::Serialize;

pub struct Info;

/// Summary of the running MOC, as printed by `--info json`.
#[derive(Debug, Serialize)]
pub struct MocInfo<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<&'a str>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub moc_type: Option<MocType>,
    pub order: u8,
    pub cells: usize,
    pub area_sq_deg: f64,
}

impl<'a> MocInfo<'a> {
    pub fn new(moc: &'a Moc) -> Self {
        Self {
            name: moc.name.as_deref(),
            id: moc.id.as_deref(),
            moc_type: moc.moc_type(),
            order: moc.order(),
            cells: moc.cells(),
            area_sq_deg: moc.area_sq_deg(),
        }
    }

    fn to_text(&self) -> String {
        let mut lines = Vec::new();
        if let Some(name) = self.name {
            lines.push(format!("Name: {}", name));
        }
        if let Some(id) = self.id {
            lines.push(format!("Identifier: {}", id));
        }
        if let Some(moc_type) = self.moc_type {
            lines.push(format!("Type: {}", moc_type));
        }
        lines.push(format!("Order: {}", self.order));
        lines.push(format!("Cells: {}", self.cells));
        lines.push(format!("Area: {} square degrees", self.area_sq_deg));
        lines.join("\n")
    }
}

impl Command for Info {
    fn aliases(&self) -> &'static [&'static str] {
        &["--info", "-i"]
    }

    fn description(&self) -> &'static str {
        "Display basic information about the running MOC"
    }

    fn usage(&self) -> &'static str {
        "Prints the name, identifier, type, order, cell count and area of the\n\
         running MOC. Follow with 'json' for a JSON object instead.\n\
         \n\
         \x20   moc-tool a.fits --info [json]"
    }

    fn execute(&self, session: &mut Session, params: &mut Params) -> MocResult<CommandOutput> {
        let json = params.take_if("json");
        let Some(moc) = &session.moc else {
            return Ok(CommandOutput::Text("No MOC information present".to_string()));
        };

        let info = MocInfo::new(moc);
        let text = if json {
            serde_json::to_string(&info)?
        } else {
            info.to_text()
        };
        Ok(CommandOutput::Text(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(output: CommandOutput) -> String {
        match output {
            CommandOutput::Text(text) => text,
            CommandOutput::None => panic!("expected text output"),
        }
    }

    #[test]
    fn without_moc() {
        let mut session = Session::new();
        let out = Info.execute(&mut session, &mut Params::default()).unwrap();
        assert_eq!(text(out), "No MOC information present");
    }

    #[test]
    fn text_summary() {
        let mut session = Session::new();
        session.moc = Some(Moc::with_cells(0, 0..12).unwrap().with_name("sky"));
        let out = text(Info.execute(&mut session, &mut Params::default()).unwrap());

        assert!(out.starts_with("Name: sky\nOrder: 0\nCells: 12\nArea: 41252.96"));
        assert!(out.ends_with(" square degrees"));
    }

    #[test]
    fn json_summary() {
        let mut session = Session::new();
        session.moc = Some(
            Moc::with_cells(1, [4])
                .unwrap()
                .with_id("ivo://EXAMPLE/x")
                .with_type(MocType::Catalog),
        );
        let mut params = Params::new(["json", "--version"]);
        let out = text(Info.execute(&mut session, &mut params).unwrap());

        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["id"], "ivo://EXAMPLE/x");
        assert_eq!(value["type"], "CATALOG");
        assert_eq!(value["order"], 1);
        assert_eq!(value["cells"], 1);
        assert!(value.get("name").is_none());
        assert_eq!(params.peek(), Some("--version"));
    }
}
