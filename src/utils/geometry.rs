use serde_json::Value;

/// Valide la forme de la géométrie selon le type de parcelle déclaré.
///
/// Contrôle volontairement limité à la forme du payload: ni fermeture
/// d'anneau, ni sens de rotation, ni bornes de coordonnées.
pub fn validate_geometry(plot_type: &str, geometry: &Value) -> Result<(), String> {
    match plot_type {
        "point" => validate_point(geometry),
        "rectangle" | "polygon" => validate_polygon(geometry),
        "circle" => validate_circle(geometry),
        other => Err(format!("Unknown plot type: {}", other)),
    }
}

// {type: "Point", coordinates: [lng, lat]}
fn validate_point(geometry: &Value) -> Result<(), String> {
    let err = || "Point geometry must be GeoJSON-like with coordinates [lng, lat].".to_string();

    let obj = geometry.as_object().ok_or_else(err)?;
    if obj.get("type").and_then(Value::as_str) != Some("Point") {
        return Err(err());
    }

    let coords = obj.get("coordinates").and_then(Value::as_array).ok_or_else(err)?;
    if coords.len() != 2 || !coords.iter().all(|c| c.is_number()) {
        return Err(err());
    }

    Ok(())
}

// {type: "Polygon", coordinates: [[[lng, lat], ...], ...]}
fn validate_polygon(geometry: &Value) -> Result<(), String> {
    let err = || "Rectangle/Polygon geometry must be GeoJSON-like Polygon.".to_string();

    let obj = geometry.as_object().ok_or_else(err)?;
    if obj.get("type").and_then(Value::as_str) != Some("Polygon") {
        return Err(err());
    }

    let rings = obj.get("coordinates").and_then(Value::as_array).ok_or_else(err)?;
    for ring in rings {
        let pairs = ring.as_array().ok_or_else(err)?;
        for pair in pairs {
            let coords = pair.as_array().ok_or_else(err)?;
            if coords.len() != 2 || !coords.iter().all(|c| c.is_number()) {
                return Err(err());
            }
        }
    }

    Ok(())
}

// {center: [lng, lat], radiusMeters: n > 0}
fn validate_circle(geometry: &Value) -> Result<(), String> {
    let err = || "Circle geometry must contain center [lng, lat] and radiusMeters.".to_string();

    let obj = geometry.as_object().ok_or_else(err)?;

    let center = obj.get("center").and_then(Value::as_array).ok_or_else(err)?;
    if center.len() != 2 || !center.iter().all(|c| c.is_number()) {
        return Err(err());
    }

    let radius = obj.get("radiusMeters").and_then(Value::as_f64).ok_or_else(err)?;
    if radius <= 0.0 {
        return Err(err());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_point_accepted() {
        let g = json!({"type": "Point", "coordinates": [1.0, 2.0]});
        assert!(validate_geometry("point", &g).is_ok());
    }

    #[test]
    fn test_point_with_polygon_payload_rejected() {
        let g = json!({"type": "Polygon", "coordinates": [[[0, 0], [1, 1]]]});
        assert!(validate_geometry("point", &g).is_err());
    }

    #[test]
    fn test_point_needs_two_numeric_coordinates() {
        assert!(validate_geometry("point", &json!({"type": "Point", "coordinates": [1.0]})).is_err());
        assert!(validate_geometry("point", &json!({"type": "Point", "coordinates": ["a", "b"]})).is_err());
    }

    #[test]
    fn test_polygon_and_rectangle_accept_rings_of_pairs() {
        let g = json!({
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [0.0, 0.0]]]
        });
        assert!(validate_geometry("polygon", &g).is_ok());
        assert!(validate_geometry("rectangle", &g).is_ok());
    }

    #[test]
    fn test_polygon_with_point_payload_rejected() {
        let g = json!({"type": "Point", "coordinates": [1.0, 2.0]});
        assert!(validate_geometry("polygon", &g).is_err());
    }

    #[test]
    fn test_unclosed_ring_still_accepted() {
        // Lacune connue: la fermeture de l'anneau n'est pas vérifiée
        let g = json!({
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [0.0, 1.0], [1.0, 1.0]]]
        });
        assert!(validate_geometry("polygon", &g).is_ok());
    }

    #[test]
    fn test_circle_accepted_with_positive_radius() {
        let g = json!({"center": [1.0, 2.0], "radiusMeters": 12.5});
        assert!(validate_geometry("circle", &g).is_ok());
    }

    #[test]
    fn test_circle_rejects_zero_or_missing_radius() {
        assert!(validate_geometry("circle", &json!({"center": [1.0, 2.0], "radiusMeters": 0})).is_err());
        assert!(validate_geometry("circle", &json!({"center": [1.0, 2.0]})).is_err());
    }

    #[test]
    fn test_unknown_type_rejected() {
        let g = json!({"type": "Point", "coordinates": [1.0, 2.0]});
        assert!(validate_geometry("triangle", &g).is_err());
    }
}
