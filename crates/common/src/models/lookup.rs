//! Option lists used to fill select boxes: users and project types
//!
//! Project types carry the schema of their dynamic fields, fetched at
//! runtime. Raw form input is coerced to JSON through that schema before it
//! goes into the project payload.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserOption {
    pub id: i64,

    /// Text shown in the select option
    #[serde(rename = "nombre", alias = "nombre_completo")]
    pub display_name: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Texto,
    TextoLargo,
    Numero,
    Fecha,
    Booleano,
    Seleccion,
    #[serde(other)]
    Otro,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    #[serde(rename = "nombre")]
    pub name: String,

    #[serde(rename = "etiqueta", default)]
    pub label: Option<String>,

    #[serde(rename = "tipo")]
    pub kind: FieldKind,

    #[serde(rename = "requerido", default)]
    pub required: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectType {
    pub id: i64,

    #[serde(rename = "nombre")]
    pub name: String,

    #[serde(rename = "campos", default)]
    pub fields: Vec<FieldSchema>,
}

impl FieldSchema {
    /// Convert one raw input value to its JSON form.
    ///
    /// Values that do not parse stay strings; the server owns validation.
    pub fn coerce(&self, raw: &str) -> Value {
        let trimmed = raw.trim();
        match self.kind {
            FieldKind::Numero => trimmed
                .parse::<i64>()
                .map(Value::from)
                .or_else(|_| trimmed.parse::<f64>().map(Value::from))
                .unwrap_or_else(|_| Value::String(raw.to_string())),
            FieldKind::Booleano => match trimmed {
                "true" | "1" | "on" | "si" | "sí" => Value::Bool(true),
                "false" | "0" | "off" | "no" | "" => Value::Bool(false),
                _ => Value::String(raw.to_string()),
            },
            _ => Value::String(raw.to_string()),
        }
    }
}

impl ProjectType {
    /// Coerce raw form values through this type's field schema.
    ///
    /// Keys the schema does not declare are dropped.
    pub fn coerce_fields(&self, raw: &BTreeMap<String, String>) -> Map<String, Value> {
        self.fields
            .iter()
            .filter_map(|field| {
                raw.get(&field.name)
                    .map(|value| (field.name.clone(), field.coerce(value)))
            })
            .collect()
    }

    /// First required field left blank, by declaration order
    pub fn first_missing_required(&self, raw: &BTreeMap<String, String>) -> Option<&FieldSchema> {
        self.fields.iter().find(|field| {
            field.required && raw.get(&field.name).map_or(true, |value| value.trim().is_empty())
        })
    }
}

impl FieldSchema {
    /// Name shown to the user: the label when there is one
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project_type() -> ProjectType {
        serde_json::from_str(
            r#"{
                "id": 2,
                "nombre": "Tesis",
                "campos": [
                    {"nombre": "paginas", "tipo": "numero", "requerido": true},
                    {"nombre": "financiado", "tipo": "booleano"},
                    {"nombre": "programa", "tipo": "seleccion", "opciones": ["Maestría", "Doctorado"]},
                    {"nombre": "mapa", "tipo": "geometria"}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_unknown_field_kind() {
        let pt = project_type();
        assert_eq!(pt.fields[3].kind, FieldKind::Otro);
        assert!(pt.fields[0].required);
    }

    #[test]
    fn test_coerce_fields() {
        let pt = project_type();
        let mut raw = BTreeMap::new();
        raw.insert("paginas".to_string(), "120".to_string());
        raw.insert("financiado".to_string(), "on".to_string());
        raw.insert("programa".to_string(), "Doctorado".to_string());
        raw.insert("no_declarado".to_string(), "x".to_string());

        let fields = pt.coerce_fields(&raw);
        assert_eq!(fields["paginas"], Value::from(120));
        assert_eq!(fields["financiado"], Value::Bool(true));
        assert_eq!(fields["programa"], "Doctorado");
        assert!(!fields.contains_key("no_declarado"));
    }

    #[test]
    fn test_first_missing_required() {
        let pt = project_type();
        let mut raw = BTreeMap::new();
        assert_eq!(pt.first_missing_required(&raw).map(|f| f.name.as_str()), Some("paginas"));

        raw.insert("paginas".to_string(), "  ".to_string());
        assert_eq!(pt.first_missing_required(&raw).map(FieldSchema::display_label), Some("paginas"));

        raw.insert("paginas".to_string(), "12".to_string());
        assert!(pt.first_missing_required(&raw).is_none());
    }

    #[test]
    fn test_unparseable_number_stays_text() {
        let pt = project_type();
        assert_eq!(pt.fields[0].coerce("ciento veinte"), Value::from("ciento veinte"));
        assert_eq!(pt.fields[0].coerce("12.5"), Value::from(12.5));
    }

    #[test]
    fn test_user_option_alias() {
        let user: UserOption =
            serde_json::from_str(r#"{"id": 5, "nombre_completo": "Luis Gómez"}"#).unwrap();
        assert_eq!(user.display_name, "Luis Gómez");
    }
}
