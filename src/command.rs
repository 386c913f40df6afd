//! Administrative commands over a rule store
//!
//! Text-in, markdown-out command handling for the `autolink` admin
//! surface: list, add, delete, enable, disable, set, test. A `<linkref>`
//! is either a 1-based number in the `list` output or a (partial) rule
//! name; mutating commands require the name to resolve uniquely.

use crate::compiler::{BoundaryOptions, CompiledRule};
use crate::rule::Rule;
use crate::store::Store;

pub const HELP_TEXT: &str = "###### Autolink administration\n\
    `<linkref>` is either the name of a rule, or its number in the `list` output. \
    A partial name can be given, but some commands require it to be unique.\n\
    * `add <name>` - add a new rule, named `<name>`.\n\
    * `delete <linkref>` - delete a rule.\n\
    * `disable <linkref>` - disable a rule.\n\
    * `enable <linkref>` - enable a rule.\n\
    * `list <linkref>` - list a specific rule.\n\
    * `list` - list all configured rules.\n\
    * `set <linkref> <field> value...` - set a rule's field to a value.\n\
    * `test <linkref> sample-text...` - test a rule on a sample.\n";

/// Execute one admin command line and return the markdown response.
pub fn execute(store: &dyn Store, boundaries: &BoundaryOptions, line: &str) -> String {
    let Some(args) = shlex::split(line) else {
        return "could not parse the command line".to_string();
    };
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    match args.split_first() {
        Some((&"list", rest)) => execute_list(store, rest),
        Some((&"add", rest)) => execute_add(store, rest),
        Some((&"delete", rest)) => execute_delete(store, rest),
        Some((&"enable", rest)) => execute_enable(store, rest, true),
        Some((&"disable", rest)) => execute_enable(store, rest, false),
        Some((&"set", rest)) => execute_set(store, rest),
        Some((&"test", rest)) => execute_test(store, boundaries, rest),
        _ => HELP_TEXT.to_string(),
    }
}

fn sorted_rules(store: &dyn Store) -> Vec<Rule> {
    let mut rules = store.get_rules();
    rules.sort_by(|a, b| a.display_name().cmp(b.display_name()));
    rules
}

/// Resolve a `<linkref>` to indices into the sorted rule list.
fn parse_link_ref(
    rules: &[Rule],
    arg: &str,
    require_unique: bool,
) -> Result<Vec<usize>, String> {
    if let Ok(n) = arg.parse::<usize>() {
        if n < 1 || n > rules.len() {
            return Err(format!("{} is not a valid rule number.", n));
        }
        return Ok(vec![n - 1]);
    }

    let found: Vec<usize> = rules
        .iter()
        .enumerate()
        .filter(|(_, rule)| rule.name.contains(arg))
        .map(|(i, _)| i)
        .collect();

    if found.is_empty() {
        return Err(format!("{:?} not found.", arg));
    }
    if require_unique && found.len() > 1 {
        let names: Vec<&str> = found.iter().map(|&i| rules[i].name.as_str()).collect();
        return Err(format!("{:?} matched more than one rule: {:?}", arg, names));
    }
    Ok(found)
}

fn execute_list(store: &dyn Store, args: &[&str]) -> String {
    let rules = sorted_rules(store);
    if let Some(arg) = args.first() {
        match parse_link_ref(&rules, arg, false) {
            Ok(refs) => refs
                .into_iter()
                .map(|i| rules[i].to_markdown(i + 1))
                .collect(),
            Err(err) => err,
        }
    } else {
        rules
            .iter()
            .enumerate()
            .map(|(i, rule)| rule.to_markdown(i + 1))
            .collect()
    }
}

fn execute_add(store: &dyn Store, args: &[&str]) -> String {
    if args.len() > 1 {
        return HELP_TEXT.to_string();
    }
    let name = args.first().copied().unwrap_or_default();
    let mut rules = store.get_rules();
    rules.push(Rule {
        name: name.to_string(),
        ..Default::default()
    });
    match store.save_rules(rules) {
        Ok(()) => execute_list(store, if name.is_empty() { &[] } else { args }),
        Err(err) => err.to_string(),
    }
}

fn execute_delete(store: &dyn Store, args: &[&str]) -> String {
    let [arg] = args else {
        return HELP_TEXT.to_string();
    };
    let mut rules = sorted_rules(store);
    let n = match parse_link_ref(&rules, arg, true) {
        Ok(refs) => refs[0],
        Err(err) => return err,
    };

    let removed = rules.remove(n);
    match store.save_rules(rules) {
        Ok(()) => format!("removed:\n{}", removed.to_markdown(0)),
        Err(err) => err.to_string(),
    }
}

fn execute_enable(store: &dyn Store, args: &[&str], enabled: bool) -> String {
    let [arg] = args else {
        return HELP_TEXT.to_string();
    };
    let mut rules = sorted_rules(store);
    let n = match parse_link_ref(&rules, arg, true) {
        Ok(refs) => refs[0],
        Err(err) => return err,
    };

    rules[n].disabled = !enabled;
    let name = rules[n].display_name().to_string();
    match store.save_rules(rules) {
        Ok(()) => execute_list(store, &[&name]),
        Err(err) => err.to_string(),
    }
}

fn execute_set(store: &dyn Store, args: &[&str]) -> String {
    let [arg, field, value @ ..] = args else {
        return HELP_TEXT.to_string();
    };
    if value.is_empty() {
        return HELP_TEXT.to_string();
    }
    let value = value.join(" ");

    let mut rules = sorted_rules(store);
    let n = match parse_link_ref(&rules, arg, true) {
        Ok(refs) => refs[0],
        Err(err) => return err,
    };
    let rule = &mut rules[n];

    match *field {
        "name" => rule.name = value,
        "pattern" => rule.pattern = value,
        "template" => rule.template = value,
        "scope" => rule.scope = value.split_whitespace().map(str::to_string).collect(),
        "word_match" => match parse_bool_arg(&value) {
            Ok(b) => rule.word_match = b,
            Err(err) => return err,
        },
        "disable_non_word_prefix" => match parse_bool_arg(&value) {
            Ok(b) => rule.disable_non_word_prefix = b,
            Err(err) => return err,
        },
        "disable_non_word_suffix" => match parse_bool_arg(&value) {
            Ok(b) => rule.disable_non_word_suffix = b,
            Err(err) => return err,
        },
        "disabled" => match parse_bool_arg(&value) {
            Ok(b) => rule.disabled = b,
            Err(err) => return err,
        },
        "process_bot_posts" => match parse_bool_arg(&value) {
            Ok(b) => rule.process_bot_posts = b,
            Err(err) => return err,
        },
        other => {
            return format!(
                "{:?} is not a supported field, must be one of {:?}",
                other,
                [
                    "name",
                    "pattern",
                    "template",
                    "scope",
                    "word_match",
                    "disable_non_word_prefix",
                    "disable_non_word_suffix",
                    "disabled",
                    "process_bot_posts",
                ]
            );
        }
    }

    let name = rule.display_name().to_string();
    match store.save_rules(rules) {
        Ok(()) => execute_list(store, &[&name]),
        Err(err) => err.to_string(),
    }
}

fn execute_test(store: &dyn Store, boundaries: &BoundaryOptions, args: &[&str]) -> String {
    let [arg, sample @ ..] = args else {
        return HELP_TEXT.to_string();
    };
    if sample.is_empty() {
        return HELP_TEXT.to_string();
    }
    let mut text = sample.join(" ");

    let rules = sorted_rules(store);
    let refs = match parse_link_ref(&rules, arg, false) {
        Ok(refs) => refs,
        Err(err) => return err,
    };

    let mut out = format!("- Original: `{}`\n", text);
    for i in refs {
        let rule = &rules[i];
        // Strict compilation: testing is the one place a bad rule must
        // fail loudly instead of going inert.
        let compiled = match CompiledRule::compile_strict(rule, boundaries) {
            Ok(compiled) => compiled,
            Err(err) => {
                return format!("failed to compile rule {}: {}", rule.display_name(), err);
            }
        };
        let replaced = compiled.replace(&text);
        if replaced == text {
            out.push_str(&format!("- Rule {}: _no change_\n", rule.display_name()));
        } else {
            out.push_str(&format!(
                "- Rule {}: changed to `{}`\n",
                rule.display_name(),
                replaced
            ));
            text = replaced;
        }
    }
    out
}

fn parse_bool_arg(arg: &str) -> Result<bool, String> {
    match arg.to_lowercase().as_str() {
        "true" | "on" => Ok(true),
        "false" | "off" => Ok(false),
        other => Err(format!("not a bool, {:?}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn boundaries() -> BoundaryOptions {
        BoundaryOptions::default()
    }

    fn jira_rule() -> Rule {
        Rule {
            name: "Jira".to_string(),
            pattern: r"(?P<key>MM-\d+)".to_string(),
            template: "[${key}](https://mattermost.atlassian.net/browse/${key})".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_help_for_unknown_command() {
        let store = MemoryStore::default();
        let out = execute(&store, &boundaries(), "frobnicate");
        assert!(out.contains("Autolink administration"));
    }

    #[test]
    fn test_add_and_list() {
        let store = MemoryStore::default();
        let out = execute(&store, &boundaries(), "add Visa");
        assert!(out.contains("Visa"));
        assert_eq!(store.get_rules().len(), 1);

        let listed = execute(&store, &boundaries(), "list");
        assert!(listed.contains("- 1: Visa"));
    }

    #[test]
    fn test_delete_by_number() {
        let store = MemoryStore::new(vec![jira_rule()]);
        let out = execute(&store, &boundaries(), "delete 1");
        assert!(out.contains("removed"));
        assert!(store.get_rules().is_empty());
    }

    #[test]
    fn test_delete_unknown_ref() {
        let store = MemoryStore::new(vec![jira_rule()]);
        let out = execute(&store, &boundaries(), "delete nope");
        assert!(out.contains("not found"));
        assert_eq!(store.get_rules().len(), 1);
    }

    #[test]
    fn test_ambiguous_ref_is_rejected() {
        let store = MemoryStore::new(vec![
            Rule {
                name: "JiraCloud".to_string(),
                ..jira_rule()
            },
            Rule {
                name: "JiraServer".to_string(),
                pattern: "J-\\d+".to_string(),
                ..jira_rule()
            },
        ]);
        let out = execute(&store, &boundaries(), "disable Jira");
        assert!(out.contains("more than one"));
    }

    #[test]
    fn test_enable_disable() {
        let store = MemoryStore::new(vec![jira_rule()]);
        let out = execute(&store, &boundaries(), "disable Jira");
        assert!(out.contains("**Disabled**"));
        assert!(store.get_rules()[0].disabled);

        execute(&store, &boundaries(), "enable Jira");
        assert!(!store.get_rules()[0].disabled);
    }

    #[test]
    fn test_set_pattern_and_bool_fields() {
        let store = MemoryStore::new(vec![jira_rule()]);
        // shlex tokenization: quote values that contain backslashes
        execute(&store, &boundaries(), r"set Jira pattern 'GH-\d+'");
        assert_eq!(store.get_rules()[0].pattern, r"GH-\d+");

        execute(&store, &boundaries(), "set Jira word_match on");
        assert!(store.get_rules()[0].word_match);

        let out = execute(&store, &boundaries(), "set Jira word_match maybe");
        assert!(out.contains("not a bool"));
    }

    #[test]
    fn test_set_unknown_field() {
        let store = MemoryStore::new(vec![jira_rule()]);
        let out = execute(&store, &boundaries(), "set Jira colour red");
        assert!(out.contains("not a supported field"));
    }

    #[test]
    fn test_test_command_applies_rule() {
        let store = MemoryStore::new(vec![jira_rule()]);
        let out = execute(&store, &boundaries(), "test Jira fixed MM-123 today");
        assert!(out.contains("- Original: `fixed MM-123 today`"));
        assert!(out.contains("changed to"));
        assert!(out.contains("browse/MM-123"));
    }

    #[test]
    fn test_test_command_reports_compile_error() {
        let store = MemoryStore::new(vec![Rule {
            name: "broken".to_string(),
            pattern: "(unclosed".to_string(),
            template: "x".to_string(),
            ..Default::default()
        }]);
        let out = execute(&store, &boundaries(), "test broken sample");
        assert!(out.contains("failed to compile"));
    }

    #[test]
    fn test_test_command_rejects_empty_rule() {
        let store = MemoryStore::new(vec![Rule {
            name: "empty".to_string(),
            ..Default::default()
        }]);
        let out = execute(&store, &boundaries(), "test empty sample");
        assert!(out.contains("failed to compile"));
    }

    #[test]
    fn test_test_command_works_on_disabled_rule() {
        let store = MemoryStore::new(vec![Rule {
            disabled: true,
            ..jira_rule()
        }]);
        let out = execute(&store, &boundaries(), "test Jira MM-9");
        assert!(out.contains("changed to"));
    }
}
