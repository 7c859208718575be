use occam_core::VariableRegistry;
use occam_error::{OccamResult, occam_err};
use occam_model::Model;

/// Whether any declared abbreviation is more than one character, in which
/// case relations must be written dot-separated.
fn needs_dot_separator(registry: &VariableRegistry) -> bool {
    registry.variables().iter().any(|v| v.abbrev.chars().count() > 1)
}

/// Canonical model string: relations sorted by decreasing size then
/// lexicographically on their abbreviation concatenation, relations joined
/// by `:`, variables within a relation sorted by lattice-position index.
pub fn format_model(registry: &VariableRegistry, model: &Model) -> String {
    let dotted = needs_dot_separator(registry);
    let mut relations: Vec<(usize, String)> = model
        .relations()
        .iter()
        .map(|r| {
            let abbrevs: Vec<String> = r.to_vec().iter().map(|&v| registry.variable(v).abbrev.clone()).collect();
            let text = if dotted { abbrevs.join(".") } else { abbrevs.concat() };
            (r.len(), text)
        })
        .collect();
    relations.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    relations.into_iter().map(|(_, text)| text).collect::<Vec<_>>().join(":")
}

/// Parses a model expression like `"ABC:BD"` (or, with multi-character
/// abbreviations, `"Alpha.Beta:Beta.Gamma"`) into a [`Model`] against
/// `registry`. Fails with `ParseModel` on malformed syntax or an unknown
/// abbreviation.
pub fn parse_model(registry: &VariableRegistry, expr: &str) -> OccamResult<Model> {
    let expr = expr.trim();
    if expr.is_empty() {
        return Err(occam_err!(ParseModel: "model expression is empty"));
    }

    let mut relations = Vec::new();
    for relation_str in expr.split(':') {
        if relation_str.is_empty() {
            return Err(occam_err!(ParseModel: "model expression {:?} has an empty relation", expr));
        }
        let tokens: Vec<&str> = if relation_str.contains('.') {
            relation_str.split('.').collect()
        } else {
            relation_str
                .char_indices()
                .map(|(i, c)| &relation_str[i..i + c.len_utf8()])
                .collect()
        };
        if tokens.iter().any(|t| t.is_empty()) {
            return Err(occam_err!(ParseModel: "relation {:?} has an empty variable token", relation_str));
        }

        let mut vars = occam_core::VarSet::empty();
        for token in tokens {
            vars.insert(registry.by_abbrev(token)?);
        }
        relations.push(vars);
    }

    Ok(Model::new(relations))
}

#[cfg(test)]
mod tests {
    use super::*;
    use occam_core::VarId;

    fn single_char_registry() -> VariableRegistry {
        let mut r = VariableRegistry::new();
        r.declare("Alpha", "A", 2).unwrap();
        r.declare("Beta", "B", 2).unwrap();
        r.declare("Gamma", "C", 2).unwrap();
        r.declare("Delta", "D", 2).unwrap();
        r
    }

    #[test]
    fn parses_single_character_relations() {
        let reg = single_char_registry();
        let model = parse_model(&reg, "ABC:BD").unwrap();
        assert_eq!(model.arity(), 2);
        assert!(model.relations().iter().any(|r| r.len() == 3));
        assert!(model.relations().iter().any(|r| r.len() == 2));
    }

    #[test]
    fn round_trips_through_format_and_parse() {
        let reg = single_char_registry();
        let model = parse_model(&reg, "ABC:BD").unwrap();
        let text = format_model(&reg, &model);
        let reparsed = parse_model(&reg, &text).unwrap();
        assert_eq!(model, reparsed);
    }

    #[test]
    fn dotted_relations_with_multi_character_abbreviations() {
        let mut reg = VariableRegistry::new();
        reg.declare("Alpha", "Alpha", 2).unwrap();
        reg.declare("Beta", "Beta", 2).unwrap();
        reg.declare("Gamma", "Gamma", 2).unwrap();
        let model = parse_model(&reg, "Alpha.Beta:Beta.Gamma").unwrap();
        assert_eq!(model.arity(), 2);
        let text = format_model(&reg, &model);
        assert!(text.contains('.'));
        assert_eq!(parse_model(&reg, &text).unwrap(), model);
    }

    #[test]
    fn rejects_unknown_abbreviation() {
        let reg = single_char_registry();
        let err = parse_model(&reg, "AZ").unwrap_err();
        assert_eq!(err.code(), occam_error::ErrorCode::ParseModel);
    }

    #[test]
    fn rejects_empty_expression() {
        let reg = single_char_registry();
        assert!(parse_model(&reg, "").is_err());
        assert!(parse_model(&reg, "AB:").is_err());
    }

    #[test]
    fn canonical_name_sorts_by_size_then_lexicographic_abbrev() {
        let reg = single_char_registry();
        let model = Model::new([
            occam_core::VarSet::from_iter([VarId(1), VarId(3)]), // BD
            occam_core::VarSet::from_iter([VarId(0), VarId(1), VarId(2)]), // ABC
        ]);
        assert_eq!(format_model(&reg, &model), "ABC:BD");
    }
}
