use serde::Deserialize;
use serde_json::Value;

/// Forme acceptée en entrée pour growth_stages:
/// soit une liste ordonnée de noms d'étapes, soit une seule chaîne
/// délimitée par `,` ou `|` (ex: "Seedling|Vegetative|Harvest").
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum GrowthStagesInput {
    List(Vec<String>),
    Delimited(String),
}

/// Représentation de stockage, fixée à la définition du schéma
/// (voir models::crop::GROWTH_STAGES_STORAGE). Pas d'inspection du
/// type de colonne à l'exécution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StageStorage {
    DelimitedString, // Colonne TEXT, jointure avec "|"
    JsonList,        // Colonne JSONB, liste ordonnée
}

/// Valeur prête à être persistée
#[derive(Debug, Clone, PartialEq)]
pub enum StoredStages {
    Text(String),
    List(Vec<String>),
}

impl GrowthStagesInput {
    /// Extrait une entrée growth_stages d'une valeur JSON libre.
    /// Tout autre type que liste/chaîne est un échec de validation.
    pub fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Array(items) => {
                let stages = items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect();
                Ok(GrowthStagesInput::List(stages))
            }
            Value::String(s) => Ok(GrowthStagesInput::Delimited(s.clone())),
            _ => Err("growth_stages must be a list or a string".to_string()),
        }
    }
}

/// API -> BD: convertit l'entrée vers la forme canonique persistée.
pub fn normalize(input: GrowthStagesInput, storage: StageStorage) -> StoredStages {
    match storage {
        StageStorage::DelimitedString => {
            let text = match input {
                GrowthStagesInput::List(stages) => stages.join("|"),
                GrowthStagesInput::Delimited(s) => s,
            };
            StoredStages::Text(text)
        }
        StageStorage::JsonList => {
            let stages = match input {
                GrowthStagesInput::List(stages) => stages,
                GrowthStagesInput::Delimited(s) => split_stages(&s),
            };
            StoredStages::List(stages)
        }
    }
}

/// BD -> API: expose toujours une liste ordonnée d'étapes
/// non vides et sans espaces parasites.
pub fn expand(stored: &StoredStages) -> Vec<String> {
    match stored {
        StoredStages::Text(s) => split_stages(s),
        StoredStages::List(stages) => stages
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
    }
}

// Découpe sur "," ou "|", trim, ignore les segments vides
fn split_stages(raw: &str) -> Vec<String> {
    raw.split(|c| c == ',' || c == '|')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_input_joined_for_text_storage() {
        let input = GrowthStagesInput::from_value(&json!(["Seedling", "Vegetative"])).unwrap();
        let stored = normalize(input, StageStorage::DelimitedString);
        assert_eq!(stored, StoredStages::Text("Seedling|Vegetative".to_string()));
    }

    #[test]
    fn test_delimited_input_kept_as_is_for_text_storage() {
        let input = GrowthStagesInput::from_value(&json!("Seedling,Vegetative")).unwrap();
        let stored = normalize(input, StageStorage::DelimitedString);
        assert_eq!(stored, StoredStages::Text("Seedling,Vegetative".to_string()));
    }

    #[test]
    fn test_delimited_input_split_for_json_storage() {
        let input = GrowthStagesInput::Delimited("Seedling | Vegetative,Harvest".to_string());
        let stored = normalize(input, StageStorage::JsonList);
        assert_eq!(
            stored,
            StoredStages::List(vec![
                "Seedling".to_string(),
                "Vegetative".to_string(),
                "Harvest".to_string()
            ])
        );
    }

    #[test]
    fn test_expand_trims_and_drops_empty_segments() {
        let stored = StoredStages::Text(" Seedling |  | Harvest ,".to_string());
        assert_eq!(expand(&stored), vec!["Seedling", "Harvest"]);
    }

    #[test]
    fn test_round_trip_is_idempotent_under_pipe_storage() {
        let stages = vec!["Seedling".to_string(), "Vegetative".to_string(), "Harvest".to_string()];
        let stored = normalize(GrowthStagesInput::List(stages.clone()), StageStorage::DelimitedString);
        assert_eq!(expand(&stored), stages);

        // Re-normaliser la sortie redonne la même forme stockée
        let restored = normalize(GrowthStagesInput::List(expand(&stored)), StageStorage::DelimitedString);
        assert_eq!(restored, stored);
    }

    #[test]
    fn test_rejects_non_list_non_string() {
        assert!(GrowthStagesInput::from_value(&json!(42)).is_err());
        assert!(GrowthStagesInput::from_value(&json!({"stage": "Seedling"})).is_err());
        assert!(GrowthStagesInput::from_value(&json!(null)).is_err());
    }
}
