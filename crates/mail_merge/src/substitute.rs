//! Placeholder substitution over a document's paragraphs
//!
//! Every paragraph in the enabled regions is handled as one string: the
//! concatenation of its runs, so a placeholder Word has split across runs is
//! still replaced. Keys are applied in mapping order, each one replacing
//! all occurrences of its patterns in the working text before the next key
//! looks at it. Within a key the pattern set's order decides, so `$<key>`
//! takes its dollar sign before `<key>` is tried. Replacement is literal.
//! A paragraph whose text changes is collapsed into one unformatted run.

use crate::mapping::PlaceholderMapping;
use crate::placeholder::PatternSet;
use doc_model::{Document, Paragraph, RegionSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use store::KindSettings;
use tracing::debug;

/// What to scan and how placeholders are written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubstitutionOptions {
    pub patterns: PatternSet,
    /// Body paragraphs and table cells are always scanned; the header and
    /// footer flags are honoured
    pub regions: RegionSet,
}

impl Default for SubstitutionOptions {
    fn default() -> Self {
        Self {
            patterns: PatternSet::standard(),
            regions: RegionSet::all(),
        }
    }
}

impl SubstitutionOptions {
    pub fn with_patterns(mut self, patterns: PatternSet) -> Self {
        self.patterns = patterns;
        self
    }

    pub fn with_headers(mut self, enabled: bool) -> Self {
        self.regions = self.regions.with_headers(enabled);
        self
    }

    pub fn with_footers(mut self, enabled: bool) -> Self {
        self.regions = self.regions.with_footers(enabled);
        self
    }

    /// Options for a configured document kind
    pub fn for_kind(kind: &KindSettings) -> Self {
        Self::default()
            .with_patterns(kind.syntax.into())
            .with_headers(kind.scan_headers)
            .with_footers(kind.scan_footers)
    }

    fn effective_regions(&self) -> RegionSet {
        RegionSet {
            body: true,
            table_cells: true,
            ..self.regions
        }
    }
}

/// Counts gathered while substituting one document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubstitutionReport {
    pub paragraphs_visited: usize,
    pub paragraphs_rewritten: usize,
    pub replacements: usize,
    /// Replacements per key; keys that never matched are absent
    pub keys_used: BTreeMap<String, usize>,
}

impl SubstitutionReport {
    pub fn changed(&self) -> bool {
        self.paragraphs_rewritten > 0
    }

    /// Mapping keys that never matched
    pub fn unused_keys<'a>(&self, mapping: &'a PlaceholderMapping) -> Vec<&'a str> {
        mapping.keys().filter(|k| !self.keys_used.contains_key(*k)).collect()
    }
}

/// One mapping entry with its patterns in priority order
struct Entry<'m> {
    key: &'m str,
    value: &'m str,
    patterns: Vec<String>,
}

/// The patterns of a whole mapping, in mapping order
struct Matcher<'m> {
    entries: Vec<Entry<'m>>,
}

impl<'m> Matcher<'m> {
    fn new(mapping: &'m PlaceholderMapping, patterns: &PatternSet) -> Self {
        let entries = mapping
            .iter()
            .map(|(key, value)| Entry {
                key,
                value,
                patterns: patterns.patterns_for(key),
            })
            .collect();
        Self { entries }
    }

    /// Replace every placeholder in `text`, key by key over the working
    /// text; `None` when nothing matched
    fn replace(
        &self,
        text: &str,
        used: &mut BTreeMap<String, usize>,
    ) -> Option<(String, usize)> {
        let mut working: Option<String> = None;
        let mut replacements = 0;

        for entry in &self.entries {
            for pattern in &entry.patterns {
                let current = working.as_deref().unwrap_or(text);
                let found = current.matches(pattern.as_str()).count();
                if found == 0 {
                    continue;
                }
                let next = current.replace(pattern.as_str(), entry.value);
                working = Some(next);
                replacements += found;
                *used.entry(entry.key.to_string()).or_insert(0) += found;
            }
        }

        working.map(|replaced| (replaced, replacements))
    }
}

/// Substitutes a mapping into documents
#[derive(Debug, Clone, Default)]
pub struct Substituter {
    options: SubstitutionOptions,
}

impl Substituter {
    pub fn new(options: SubstitutionOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SubstitutionOptions {
        &self.options
    }

    /// Replace placeholders in every paragraph of the enabled regions.
    ///
    /// Never fails: keys without a match are ignored and paragraphs without
    /// a match keep their runs untouched.
    pub fn substitute(
        &self,
        document: &mut Document,
        mapping: &PlaceholderMapping,
    ) -> SubstitutionReport {
        let mut report = SubstitutionReport::default();
        if mapping.is_empty() || self.options.patterns.is_empty() {
            report.paragraphs_visited = document.paragraph_count(self.options.effective_regions());
            return report;
        }

        let matcher = Matcher::new(mapping, &self.options.patterns);
        document.for_each_paragraph_mut(self.options.effective_regions(), |_, paragraph| {
            report.paragraphs_visited += 1;
            let outcome = substitute_paragraph(&matcher, paragraph, &mut report.keys_used);
            if let Some((count, rewritten)) = outcome {
                report.replacements += count;
                if rewritten {
                    report.paragraphs_rewritten += 1;
                }
            }
        });

        debug!(
            visited = report.paragraphs_visited,
            rewritten = report.paragraphs_rewritten,
            replacements = report.replacements,
            "substituted placeholders"
        );
        report
    }

    /// Replace placeholders in a single string
    pub fn substitute_text(&self, text: &str, mapping: &PlaceholderMapping) -> String {
        let matcher = Matcher::new(mapping, &self.options.patterns);
        let mut used = BTreeMap::new();
        match matcher.replace(text, &mut used) {
            Some((replaced, _)) => replaced,
            None => text.to_string(),
        }
    }
}

fn substitute_paragraph(
    matcher: &Matcher<'_>,
    paragraph: &mut Paragraph,
    used: &mut BTreeMap<String, usize>,
) -> Option<(usize, bool)> {
    let text = paragraph.text();
    let (replaced, count) = matcher.replace(&text, used)?;
    // A value equal to its own placeholder leaves the runs alone
    let rewritten = replaced != text;
    if rewritten {
        paragraph.replace_runs_with_text(replaced);
    }
    Some((count, rewritten))
}

/// Substitute with the standard syntaxes over every region
pub fn substitute(document: &mut Document, mapping: &PlaceholderMapping) -> SubstitutionReport {
    Substituter::default().substitute(document, mapping)
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_model::{HeaderFooter, Run, RunStyle, Table, TableCell, TableRow};
    use proptest::prelude::*;

    fn mapping(pairs: &[(&str, &str)]) -> PlaceholderMapping {
        pairs.iter().copied().collect()
    }

    fn text_of(pairs: &[(&str, &str)], text: &str) -> String {
        Substituter::default().substitute_text(text, &mapping(pairs))
    }

    #[test]
    fn test_every_syntax_is_replaced() {
        let pairs = [("NIT", "900123456")];
        assert_eq!(text_of(&pairs, "${NIT}"), "900123456");
        assert_eq!(text_of(&pairs, "$<NIT>"), "900123456");
        assert_eq!(text_of(&pairs, "<NIT>"), "900123456");
        assert_eq!(text_of(&pairs, "« NIT»"), "900123456");
        assert_eq!(
            text_of(&pairs, "NIT: <NIT>, otra vez <NIT>."),
            "NIT: 900123456, otra vez 900123456."
        );
    }

    #[test]
    fn test_dollar_variant_consumes_dollar_sign() {
        let pairs = [("Valor", "1.200")];
        assert_eq!(text_of(&pairs, "Total $<Valor> COP"), "Total 1.200 COP");
        assert_eq!(text_of(&pairs, "$$<Valor>"), "$1.200");
    }

    #[test]
    fn test_mixed_syntaxes_for_one_key() {
        assert_eq!(text_of(&[("Nombre", "Ana")], "${Nombre} y <Nombre>"), "Ana y Ana");
    }

    #[test]
    fn test_later_keys_see_earlier_replacements() {
        let pairs = [("A", "<B>"), ("B", "x")];
        assert_eq!(text_of(&pairs, "<A> <B>"), "x x");
        // An earlier key is not revisited
        let pairs = [("B", "x"), ("A", "<B>")];
        assert_eq!(text_of(&pairs, "<A> <B>"), "<B> x");
    }

    #[test]
    fn test_placeholder_formed_next_to_a_value_is_replaced() {
        let pairs = [("A", "<"), ("B", "x")];
        assert_eq!(text_of(&pairs, "<A>B>"), "x");
        let pairs = [("A", ""), ("B", "x")];
        assert_eq!(text_of(&pairs, "<<A>B>"), "x");
    }

    #[test]
    fn test_replacement_counts_every_occurrence() {
        let values = mapping(&[("NIT", "1")]);
        let mut used = BTreeMap::new();
        let matcher = Matcher::new(&values, &PatternSet::standard());
        let (text, count) = matcher.replace("<NIT> $<NIT> <NIT>", &mut used).unwrap();
        assert_eq!(text, "1 1 1");
        assert_eq!(count, 3);
        assert_eq!(used.get("NIT"), Some(&3));
    }

    #[test]
    fn test_keys_are_case_sensitive() {
        assert_eq!(text_of(&[("MES", "MARZO")], "<Mes> <MES>"), "<Mes> MARZO");
    }

    #[test]
    fn test_legacy_syntax_leaves_dollar_forms() {
        let options = SubstitutionOptions::default().with_patterns(PatternSet::legacy());
        let substituter = Substituter::new(options);
        let result = substituter.substitute_text("${NIT} <NIT>", &mapping(&[("NIT", "1")]));
        assert_eq!(result, "${NIT} 1");
    }

    #[test]
    fn test_split_run_placeholder() {
        let mut document = Document::new();
        document.add_paragraph(Paragraph::from_runs(vec![
            Run::with_style("NIT <NIT", RunStyle { bold: Some(true), ..Default::default() }),
            Run::new(">"),
        ]));

        let report = substitute(&mut document, &mapping(&[("NIT", "900123456")]));

        let paragraph = &document.paragraphs()[0];
        assert_eq!(paragraph.text(), "NIT 900123456");
        assert_eq!(paragraph.runs().len(), 1);
        assert!(paragraph.runs()[0].style.is_empty());
        assert_eq!(report.paragraphs_rewritten, 1);
        assert_eq!(report.keys_used.get("NIT"), Some(&1));
    }

    #[test]
    fn test_no_match_leaves_runs_untouched() {
        let mut document = Document::new();
        document.add_paragraph(Paragraph::from_runs(vec![
            Run::with_style("Estimado ", RunStyle { italic: Some(true), ..Default::default() }),
            Run::new("cliente <Otro>"),
        ]));
        let before: Vec<_> = document.paragraphs()[0]
            .runs()
            .iter()
            .map(|r| (r.id(), r.text.clone()))
            .collect();

        let report = substitute(&mut document, &mapping(&[("Nombre", "Ana")]));

        let after: Vec<_> = document.paragraphs()[0]
            .runs()
            .iter()
            .map(|r| (r.id(), r.text.clone()))
            .collect();
        assert_eq!(before, after);
        assert!(!report.changed());
        assert_eq!(report.paragraphs_visited, 1);
        assert_eq!(report.unused_keys(&mapping(&[("Nombre", "Ana")])), vec!["Nombre"]);
    }

    #[test]
    fn test_all_regions_and_header_switch() {
        let build = || {
            let mut document = Document::new();
            document.add_paragraph(Paragraph::with_text("Señor <Nombre>"));
            let mut table = Table::new();
            table.add_row(TableRow::from_cells(vec![TableCell::with_text("NIT ${NIT}")]));
            document.add_table(table);
            let mut header = HeaderFooter::new();
            header.content.add_paragraph(Paragraph::with_text("Bogotá, <día> de <Mes>"));
            document.add_header(header);
            let mut footer = HeaderFooter::new();
            footer.content.add_paragraph(Paragraph::with_text("<MES> <AÑO>"));
            document.add_footer(footer);
            document
        };
        let values = mapping(&[
            ("día", "5"),
            ("Mes", "marzo"),
            ("MES", "MARZO"),
            ("AÑO", "2025"),
            ("Nombre", "Ana"),
            ("NIT", "900123456"),
        ]);

        let mut document = build();
        let report = substitute(&mut document, &values);
        assert_eq!(
            document.plain_text(RegionSet::all()),
            "Señor Ana\nNIT 900123456\nBogotá, 5 de marzo\nMARZO 2025"
        );
        assert_eq!(report.paragraphs_rewritten, 4);
        assert_eq!(report.replacements, 6);

        let mut document = build();
        let no_headers = Substituter::new(SubstitutionOptions::default().with_headers(false));
        no_headers.substitute(&mut document, &values);
        assert_eq!(
            document.plain_text(RegionSet::all()),
            "Señor Ana\nNIT 900123456\nBogotá, <día> de <Mes>\nMARZO 2025"
        );
    }

    #[test]
    fn test_body_is_always_scanned() {
        let mut document = Document::new();
        document.add_paragraph(Paragraph::with_text("<NIT>"));
        let options = SubstitutionOptions {
            regions: RegionSet { body: false, table_cells: false, headers: false, footers: false },
            ..Default::default()
        };
        Substituter::new(options).substitute(&mut document, &mapping(&[("NIT", "1")]));
        assert_eq!(document.paragraphs()[0].text(), "1");
    }

    #[test]
    fn test_second_pass_can_change_text() {
        let mut document = Document::new();
        document.add_paragraph(Paragraph::with_text("<A>"));
        let values = mapping(&[("B", "fin"), ("A", "<B>")]);

        substitute(&mut document, &values);
        assert_eq!(document.paragraphs()[0].text(), "<B>");
        substitute(&mut document, &values);
        assert_eq!(document.paragraphs()[0].text(), "fin");
    }

    #[test]
    fn test_value_equal_to_placeholder_keeps_runs() {
        let mut document = Document::new();
        document.add_paragraph(Paragraph::from_runs(vec![Run::new("<A"), Run::new(">")]));
        let report = substitute(&mut document, &mapping(&[("A", "<A>")]));
        assert_eq!(document.paragraphs()[0].runs().len(), 2);
        assert_eq!(report.replacements, 1);
        assert!(!report.changed());
    }

    fn key_strategy() -> impl Strategy<Value = String> {
        "[A-Za-zÁÉÍÓÚÑáéíóúñ ]{1,12}"
    }

    fn value_strategy() -> impl Strategy<Value = String> {
        "[A-Za-z0-9 .,áéñ<$-]{0,16}"
    }

    proptest! {
        #[test]
        fn prop_placeholders_are_removed(
            entries in prop::collection::vec((key_strategy(), value_strategy()), 1..5),
            filler in "[a-zA-Z ,.<$]{0,10}",
        ) {
            let values: PlaceholderMapping = entries.iter().cloned().collect();
            let mut text = filler.clone();
            for (key, _) in &entries {
                for pattern in PatternSet::standard().patterns_for(key) {
                    text.push_str(&pattern);
                    text.push_str(&filler);
                }
            }

            let result = Substituter::default().substitute_text(&text, &values);
            for key in values.keys() {
                for pattern in PatternSet::standard().patterns_for(key) {
                    prop_assert!(!result.contains(&pattern), "{:?} left in {:?}", pattern, result);
                }
            }
        }
    }
}
