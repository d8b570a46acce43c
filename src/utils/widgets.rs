use serde::{Serialize, Deserialize};
use serde_json::Value;

/// Un widget du dashboard: nom + visibilité, rien d'autre n'est conservé
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    pub name: String,
    pub visible: bool,
}

/// Valide la liste complète de widgets envoyée par le client.
/// Les erreurs sont qualifiées par l'index de l'élément fautif,
/// ex: "widgets[2].visible must be a boolean".
pub fn validate_widgets(value: &Value) -> Result<Vec<Widget>, String> {
    let items = match value {
        Value::Array(items) => items,
        _ => return Err("widgets must be a list".to_string()),
    };

    let mut widgets = Vec::with_capacity(items.len());

    for (i, item) in items.iter().enumerate() {
        let obj = match item {
            Value::Object(obj) => obj,
            _ => return Err(format!("widgets[{}] must be an object", i)),
        };

        if !obj.contains_key("name") || !obj.contains_key("visible") {
            return Err(format!("widgets[{}] must include 'name' and 'visible'", i));
        }

        let name = match obj.get("name") {
            Some(Value::String(s)) => s.clone(),
            _ => return Err(format!("widgets[{}].name must be a string", i)),
        };

        let visible = match obj.get("visible") {
            Some(Value::Bool(b)) => *b,
            _ => return Err(format!("widgets[{}].visible must be a boolean", i)),
        };

        widgets.push(Widget { name, visible });
    }

    Ok(widgets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_widget_list_accepted() {
        let value = json!([
            {"name": "weather", "visible": true},
            {"name": "tasks", "visible": false}
        ]);
        let widgets = validate_widgets(&value).unwrap();
        assert_eq!(widgets.len(), 2);
        assert_eq!(widgets[0].name, "weather");
        assert!(!widgets[1].visible);
    }

    #[test]
    fn test_non_list_rejected() {
        let err = validate_widgets(&json!({"name": "weather"})).unwrap_err();
        assert_eq!(err, "widgets must be a list");
    }

    #[test]
    fn test_missing_key_error_names_index() {
        let value = json!([
            {"name": "weather", "visible": true},
            {"name": "tasks"}
        ]);
        let err = validate_widgets(&value).unwrap_err();
        assert_eq!(err, "widgets[1] must include 'name' and 'visible'");
    }

    #[test]
    fn test_wrong_name_type_rejected() {
        let value = json!([{"name": 12, "visible": true}]);
        let err = validate_widgets(&value).unwrap_err();
        assert_eq!(err, "widgets[0].name must be a string");
    }

    #[test]
    fn test_wrong_visible_type_rejected() {
        let value = json!([{"name": "weather", "visible": "yes"}]);
        let err = validate_widgets(&value).unwrap_err();
        assert_eq!(err, "widgets[0].visible must be a boolean");
    }

    #[test]
    fn test_extra_keys_dropped_on_normalization() {
        let value = json!([{"name": "weather", "visible": true, "color": "blue"}]);
        let widgets = validate_widgets(&value).unwrap();
        let round_trip = serde_json::to_value(&widgets).unwrap();
        assert_eq!(round_trip, json!([{"name": "weather", "visible": true}]));
    }
}
