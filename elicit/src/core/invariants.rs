//! Registry contract checks not expressible in the type system.

use std::collections::HashSet;

/// Declared dependencies of one field, as seen by the contract check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredField<'a> {
    pub name: &'a str,
    pub requires: &'a [String],
    pub influenced_by: &'a [String],
}

/// Check registry invariants:
/// - No duplicate field names
/// - `requires` / `influenced_by` only name declared fields
/// - No field depends on itself
/// - No name is listed twice in one dependency list
pub fn validate_contract(fields: &[DeclaredField<'_>]) -> Vec<String> {
    let mut errors = Vec::new();
    let mut declared = HashSet::new();
    for field in fields {
        if !declared.insert(field.name) {
            errors.push(format!("duplicate field '{}'", field.name));
        }
    }

    for field in fields {
        check_list(field, "requires", field.requires, &declared, &mut errors);
        check_list(
            field,
            "influenced_by",
            field.influenced_by,
            &declared,
            &mut errors,
        );
    }
    errors
}

fn check_list(
    field: &DeclaredField<'_>,
    label: &str,
    deps: &[String],
    declared: &HashSet<&str>,
    errors: &mut Vec<String>,
) {
    let mut seen = HashSet::new();
    for dep in deps {
        if dep == field.name {
            errors.push(format!("{}: {} references the field itself", field.name, label));
        } else if !declared.contains(dep.as_str()) {
            errors.push(format!(
                "{}: {} references unknown field '{}'",
                field.name, label, dep
            ));
        }
        if !seen.insert(dep.as_str()) {
            errors.push(format!("{}: {} lists '{}' twice", field.name, label, dep));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn clean_registry_has_no_errors() {
        let none = names(&[]);
        let a = names(&["a"]);
        let fields = [
            DeclaredField {
                name: "a",
                requires: &none,
                influenced_by: &none,
            },
            DeclaredField {
                name: "b",
                requires: &a,
                influenced_by: &none,
            },
        ];
        assert!(validate_contract(&fields).is_empty());
    }

    #[test]
    fn reports_unknown_self_and_duplicate_references() {
        let none = names(&[]);
        let bad_requires = names(&["a", "ghost"]);
        let twice = names(&["b", "b"]);
        let fields = [
            DeclaredField {
                name: "a",
                requires: &bad_requires,
                influenced_by: &none,
            },
            DeclaredField {
                name: "b",
                requires: &none,
                influenced_by: &none,
            },
            DeclaredField {
                name: "c",
                requires: &none,
                influenced_by: &twice,
            },
            DeclaredField {
                name: "c",
                requires: &none,
                influenced_by: &none,
            },
        ];

        let errors = validate_contract(&fields);
        assert_eq!(
            errors,
            vec![
                "duplicate field 'c'".to_string(),
                "a: requires references the field itself".to_string(),
                "a: requires references unknown field 'ghost'".to_string(),
                "c: influenced_by lists 'b' twice".to_string(),
            ]
        );
    }
}
