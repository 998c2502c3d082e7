use serde_json::{Map, Value};
use std::collections::HashSet;

use crate::error::ErrorKind;
use crate::models::{AnalysisResult, Difficulty, NutrientEntry, NutrientType, RecipeEntry};

/// Advice length the prompt asks for. Longer advice is accepted but logged.
pub const ADVICE_MAX_CHARS: usize = 150;

/// Check that a parsed model response has the full analysis shape and convert it.
///
/// Recipes must cover every difficulty tier exactly once, in any order. A duplicated
/// tier is rejected rather than relabeled.
pub fn validate(value: Value) -> Result<AnalysisResult, ErrorKind> {
    let object = value
        .as_object()
        .ok_or_else(|| violation("top-level value is not an object"))?;

    let name = required_string(object, "name").map_err(violation)?;
    if name.trim().is_empty() {
        return Err(violation("'name' is empty"));
    }

    let nutrients = required_array(object, "nutrients")
        .map_err(violation)?
        .iter()
        .enumerate()
        .map(|(i, entry)| parse_nutrient(i, entry))
        .collect::<Result<Vec<_>, _>>()?;
    if nutrients.is_empty() {
        return Err(violation("'nutrients' is empty"));
    }

    let advice = required_string(object, "advice").map_err(violation)?;
    let advice_chars = advice.chars().count();
    if advice_chars > ADVICE_MAX_CHARS {
        log::warn!(
            "⚠️ Advice exceeds {} characters ({}), accepting anyway",
            ADVICE_MAX_CHARS,
            advice_chars
        );
    }

    let recipes = required_array(object, "recipes")
        .map_err(violation)?
        .iter()
        .enumerate()
        .map(|(i, entry)| parse_recipe(i, entry))
        .collect::<Result<Vec<_>, _>>()?;
    check_recipe_tiers(&recipes)?;

    Ok(AnalysisResult {
        name,
        nutrients,
        advice,
        recipes,
    })
}

fn violation(detail: impl Into<String>) -> ErrorKind {
    ErrorKind::SchemaViolation(detail.into())
}

fn required_string(object: &Map<String, Value>, field: &str) -> Result<String, String> {
    match object.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(format!("'{}' is not a string: {}", field, other)),
        None => Err(format!("missing '{}'", field)),
    }
}

fn required_array<'a>(object: &'a Map<String, Value>, field: &str) -> Result<&'a [Value], String> {
    match object.get(field) {
        Some(Value::Array(items)) => Ok(items.as_slice()),
        Some(_) => Err(format!("'{}' is not an array", field)),
        None => Err(format!("missing '{}'", field)),
    }
}

fn parse_nutrient(index: usize, entry: &Value) -> Result<NutrientEntry, ErrorKind> {
    let object = entry
        .as_object()
        .ok_or_else(|| violation(format!("nutrients[{}] is not an object", index)))?;

    let context = |e: String| violation(format!("nutrients[{}]: {}", index, e));

    let name = required_string(object, "name").map_err(context)?;
    if name.trim().is_empty() {
        return Err(violation(format!("nutrients[{}]: 'name' is empty", index)));
    }

    let raw_type = required_string(object, "type").map_err(context)?;
    let nutrient_type = NutrientType::from_string(raw_type.trim()).ok_or_else(|| {
        violation(format!("nutrients[{}]: unknown type '{}'", index, raw_type))
    })?;

    Ok(NutrientEntry {
        name,
        nutrient_type,
    })
}

fn parse_recipe(index: usize, entry: &Value) -> Result<RecipeEntry, ErrorKind> {
    let object = entry
        .as_object()
        .ok_or_else(|| violation(format!("recipes[{}] is not an object", index)))?;
    let context = |e: String| violation(format!("recipes[{}]: {}", index, e));

    let title = required_string(object, "title").map_err(context)?;
    if title.trim().is_empty() {
        return Err(violation(format!("recipes[{}]: 'title' is empty", index)));
    }
    let desc = required_string(object, "desc").map_err(context)?;

    let raw_difficulty = required_string(object, "difficulty").map_err(context)?;
    let difficulty = Difficulty::from_string(&raw_difficulty).ok_or_else(|| {
        violation(format!(
            "recipes[{}]: unknown difficulty '{}'",
            index, raw_difficulty
        ))
    })?;

    Ok(RecipeEntry {
        title,
        desc,
        difficulty,
    })
}

fn check_recipe_tiers(recipes: &[RecipeEntry]) -> Result<(), ErrorKind> {
    if recipes.len() != Difficulty::ALL.len() {
        return Err(violation(format!(
            "expected {} recipes, got {}",
            Difficulty::ALL.len(),
            recipes.len()
        )));
    }

    let mut seen = HashSet::new();
    for recipe in recipes {
        if !seen.insert(recipe.difficulty) {
            return Err(violation(format!(
                "difficulty '{}' appears more than once",
                recipe.difficulty
            )));
        }
    }

    Ok(())
}

/// Allergy terms found in recipe titles or descriptions.
///
/// The exclusion is only requested in the prompt, so this is a best-effort scan used
/// for logging. The allergy text is split on common list separators.
pub fn allergy_mentions(result: &AnalysisResult, allergies: &str) -> Vec<String> {
    let terms: Vec<&str> = allergies
        .split(|c: char| c.is_whitespace() || matches!(c, '、' | ',' | '，' | '/' | '・'))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();

    let mut found = Vec::new();
    for term in terms {
        let mentioned = result
            .recipes
            .iter()
            .any(|r| r.title.contains(term) || r.desc.contains(term));
        if mentioned && !found.iter().any(|f| f == term) {
            found.push(term.to_string());
        }
    }
    found
}
