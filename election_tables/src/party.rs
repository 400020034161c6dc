/// Removes the alignment spaces and the footnote annotations (`※1 ...`)
/// that the sources add to the party names.
pub fn clean_label(label: &str) -> String {
    let without_note = match label.find('※') {
        Some(idx) => &label[..idx],
        None => label,
    };
    without_note.chars().filter(|c| !c.is_whitespace()).collect()
}

/// The closed list of the parties known for an election, and the aliases
/// under which the sources may spell them.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct PartyNames {
    known: Vec<String>,
    aliases: Vec<(String, String)>,
}

impl PartyNames {
    pub fn new(known: &[String], aliases: &[(String, String)]) -> PartyNames {
        PartyNames {
            known: known.iter().map(|s| clean_label(s)).collect(),
            aliases: aliases
                .iter()
                .map(|(from, to)| (clean_label(from), clean_label(to)))
                .collect(),
        }
    }

    pub fn known(&self) -> &[String] {
        &self.known
    }

    /// The cleaned name, with the aliases applied.
    pub fn normalize(&self, label: &str) -> String {
        let cleaned = clean_label(label);
        match self.aliases.iter().find(|(from, _)| *from == cleaned) {
            Some((_, to)) => to.clone(),
            None => cleaned,
        }
    }

    /// The first known party (in list order) whose name appears in the label.
    pub fn match_known(&self, label: &str) -> Option<&str> {
        let name = self.normalize(label);
        if name.is_empty() {
            return None;
        }
        self.known
            .iter()
            .find(|p| name.contains(p.as_str()))
            .map(|p| p.as_str())
    }

    /// The name under which a party found in a header is reported: a known
    /// party when the header mentions one, the normalized header otherwise.
    pub fn canonical(&self, label: &str) -> String {
        match self.match_known(label) {
            Some(p) => p.to_string(),
            None => self.normalize(label),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> PartyNames {
        PartyNames::new(
            &[
                "自由民主党".to_string(),
                "日本維新の会".to_string(),
                "NHK党".to_string(),
            ],
            &[("ＮＨＫ党".to_string(), "NHK党".to_string())],
        )
    }

    #[test]
    fn cleaning() {
        assert_eq!(clean_label(" 自由民主党 ※1 推薦を含む"), "自由民主党");
        assert_eq!(clean_label("無\u{3000}所\u{3000}属"), "無所属");
    }

    #[test]
    fn matching_known_parties() {
        let p = names();
        assert_eq!(p.match_known("自由民主党\n（得票数）"), Some("自由民主党"));
        assert_eq!(p.match_known("ＮＨＫ党"), Some("NHK党"));
        assert_eq!(p.match_known("諸派"), None);
        assert_eq!(p.match_known(""), None);
        assert_eq!(p.canonical("諸　派"), "諸派");
        assert_eq!(p.canonical("日本維新の会 ※2"), "日本維新の会");
    }
}
