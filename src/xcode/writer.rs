//! Xcode-style `project.pbxproj` output
//!
//! Objects are grouped into `/* Begin <isa> section */` blocks ordered by isa,
//! build files and file references sit on a single line, and every reference
//! to a known object carries the comment Xcode would print next to it. Output
//! for an unmodified project matches what Xcode itself writes.

use super::plist::{self, Dict, Value, WriteStyle};
use super::project::XcodeProject;
use std::collections::{BTreeMap, HashMap};

const HEADER: &str = "// !$*UTF8*$!\n";

/// Attributes holding ids of objects in other projects
const FOREIGN_ID_KEYS: &[&str] = &["remoteGlobalIDString"];

fn single_line(isa: &str) -> bool {
    matches!(isa, "PBXBuildFile" | "PBXFileReference")
}

impl XcodeProject {
    /// Serializes the project the way Xcode lays it out
    pub fn to_pbxproj(&self) -> String {
        let notes = self.annotations();
        let annotate = |id: &str| notes.get(id).cloned();
        let style = WriteStyle {
            single_line: false,
            annotate: &annotate,
        };

        let mut out = String::from(HEADER);
        out.push_str("{\n");

        let mut objects_written = false;
        for (key, value) in self.header() {
            if !objects_written && key.as_str() > "objects" {
                write_objects(&mut out, self.objects(), &notes, &style);
                objects_written = true;
            }
            plist::push_tabs(&mut out, 1);
            out.push_str(&plist::quote(key));
            out.push_str(" = ");
            plist::write_value(&mut out, value, 1, &style);
            out.push_str(";\n");
        }
        if !objects_written {
            write_objects(&mut out, self.objects(), &notes, &style);
        }

        out.push_str("}\n");
        out
    }
}

fn write_objects(
    out: &mut String,
    objects: &Dict,
    notes: &HashMap<String, String>,
    style: &WriteStyle<'_>,
) {
    let mut sections: BTreeMap<&str, Vec<(&String, &Dict)>> = BTreeMap::new();
    for (id, value) in objects {
        let Some(object) = value.as_dict() else {
            continue;
        };
        let isa = object.get("isa").and_then(Value::as_str).unwrap_or("");
        sections.entry(isa).or_default().push((id, object));
    }

    plist::push_tabs(out, 1);
    out.push_str("objects = {\n");
    for (isa, entries) in sections {
        out.push_str(&format!("\n/* Begin {} section */\n", isa));
        for (id, object) in entries {
            write_object(out, id, object, single_line(isa), notes, style);
        }
        out.push_str(&format!("/* End {} section */\n", isa));
    }
    plist::push_tabs(out, 1);
    out.push_str("};\n");
}

fn write_object(
    out: &mut String,
    id: &str,
    object: &Dict,
    inline: bool,
    notes: &HashMap<String, String>,
    style: &WriteStyle<'_>,
) {
    let plain = |_: &str| -> Option<String> { None };
    let foreign = WriteStyle {
        single_line: inline,
        annotate: &plain,
    };
    let local = WriteStyle {
        single_line: inline,
        annotate: style.annotate,
    };

    plist::push_tabs(out, 2);
    out.push_str(&plist::quote(id));
    if let Some(note) = notes.get(id) {
        out.push_str(&format!(" /* {} */", note));
    }
    out.push_str(" = {");
    if !inline {
        out.push('\n');
    }

    for (key, value) in plist::ordered_entries(object) {
        let value_style = if FOREIGN_ID_KEYS.contains(&key.as_str()) {
            &foreign
        } else {
            &local
        };
        if inline {
            out.push_str(&plist::quote(key));
            out.push_str(" = ");
            plist::write_value(out, value, 2, value_style);
            out.push_str("; ");
        } else {
            plist::push_tabs(out, 3);
            out.push_str(&plist::quote(key));
            out.push_str(" = ");
            plist::write_value(out, value, 3, value_style);
            out.push_str(";\n");
        }
    }

    if !inline {
        plist::push_tabs(out, 2);
    }
    out.push_str("};\n");
}
