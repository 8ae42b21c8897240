use serde::{Deserialize, Serialize};

/// One `[id] name` entry of the tool's model listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelEntry {
    pub id: u32,
    pub name: String,
    /// Vendor heading the entry was listed under; empty before the first heading.
    pub provider: String,
}

/// Extracts vendor names from the tool's `--listmodels` output.
///
/// Numbered model entries (`[1] gpt-4o`), the header line and blank lines
/// are dropped.
pub fn parse_vendor_listing(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('[') && !is_header(line))
        .map(ToOwned::to_owned)
        .collect()
}

/// Groups the numbered entries of `--listmodels` output under their vendor.
///
/// Lines that look like entries but carry no numeric id are skipped.
pub fn parse_model_listing(output: &str) -> Vec<ModelEntry> {
    let mut provider = String::new();
    let mut models = Vec::new();
    for line in output.lines().map(str::trim) {
        if line.is_empty() || is_header(line) {
            continue;
        }
        match parse_entry(line) {
            Some((id, name)) => models.push(ModelEntry {
                id,
                name: name.to_string(),
                provider: provider.clone(),
            }),
            None if !line.starts_with('[') => provider = line.to_string(),
            None => {}
        }
    }
    models
}

fn is_header(line: &str) -> bool {
    line.starts_with("Available models:")
}

fn parse_entry(line: &str) -> Option<(u32, &str)> {
    let (id, name) = line.strip_prefix('[')?.split_once(']')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((id.trim().parse().ok()?, name))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str =
        "Available models:\n\nOpenAI\n\t[1]\tgpt-4o\n\t[2]\tgpt-4o-mini\n\nAnthropic\n\t[3]\tclaude\n";

    #[test]
    fn keeps_only_vendor_headings() {
        assert_eq!(parse_vendor_listing(LISTING), vec!["OpenAI", "Anthropic"]);
    }

    #[test]
    fn models_are_grouped_under_their_vendor() {
        let models = parse_model_listing(LISTING);
        assert_eq!(models.len(), 3);
        assert_eq!(
            models[1],
            ModelEntry {
                id: 2,
                name: "gpt-4o-mini".into(),
                provider: "OpenAI".into(),
            }
        );
        assert_eq!(models[2].provider, "Anthropic");
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let models = parse_model_listing("Ollama\n[x] broken\n[7]\n[8] llama3:8b\n");
        assert_eq!(
            models,
            vec![ModelEntry {
                id: 8,
                name: "llama3:8b".into(),
                provider: "Ollama".into(),
            }]
        );
    }
}
