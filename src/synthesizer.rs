//! Summary and suggestion synthesis
//!
//! Turns a [`PatternSummary`] into a short templated paragraph and a list of
//! gentle, non-prescriptive suggestions. Wording is fixed per [`Locale`]; nothing
//! here is generated by a model.

use crate::types::{Locale, PatternSummary, Synthesis};

/// Strictly more high-intensity episodes than this marks the period as agitated
pub const MARKED_INTENSITY_EPISODES: u32 = 2;

/// Tags treated as fatigue signals (compared case-insensitively)
pub const FATIGUE_TAGS: &[&str] = &["fatigue", "fatigué", "fatiguée", "tired", "tiredness"];

/// Tags treated as anger or frustration signals (compared case-insensitively)
pub const ANGER_TAGS: &[&str] = &["colère", "frustration", "anger", "angry", "frustrated"];

/// Fixed wording of one suggestion
struct Wording {
    fr: &'static str,
    en: &'static str,
}

impl Wording {
    fn text(&self, locale: Locale) -> &'static str {
        match locale {
            Locale::Fr => self.fr,
            Locale::En => self.en,
        }
    }
}

/// One row of the suggestion table
struct SuggestionRule {
    applies: fn(&PatternSummary) -> bool,
    wording: Wording,
}

/// Evaluated top to bottom; every matching rule contributes its suggestion.
const SUGGESTION_RULES: &[SuggestionRule] = &[
    SuggestionRule {
        applies: has_difficult_hours,
        wording: Wording {
            fr: "Envisager des temps calmes ou de transition avant les horaires identifiés comme sensibles.",
            en: "Consider calm or transition periods before the times identified as sensitive.",
        },
    },
    SuggestionRule {
        applies: has_fatigue_tag,
        wording: Wording {
            fr: "Vérifier si le rythme de sommeil ou les temps de repos sont suffisants.",
            en: "Check whether sleep patterns and rest periods are sufficient.",
        },
    },
    SuggestionRule {
        applies: has_anger_tag,
        wording: Wording {
            fr: "Observer les déclencheurs potentiels précédant ces émotions.",
            en: "Observe the potential triggers preceding these emotions.",
        },
    },
];

/// Used only when no rule matched
const FALLBACK_SUGGESTION: Wording = Wording {
    fr: "Continuer l'observation régulière pour affiner l'analyse.",
    en: "Keep observing regularly to refine the analysis.",
};

fn has_difficult_hours(patterns: &PatternSummary) -> bool {
    !patterns.difficult_hours.is_empty()
}

fn has_fatigue_tag(patterns: &PatternSummary) -> bool {
    has_any_tag(patterns, FATIGUE_TAGS)
}

fn has_anger_tag(patterns: &PatternSummary) -> bool {
    has_any_tag(patterns, ANGER_TAGS)
}

fn has_any_tag(patterns: &PatternSummary, wanted: &[&str]) -> bool {
    patterns
        .recurring_tags
        .iter()
        .map(|t| t.to_lowercase())
        .any(|t| wanted.contains(&t.as_str()))
}

/// Templated synthesizer
#[derive(Debug, Clone, Copy, Default)]
pub struct Synthesizer {
    locale: Locale,
}

impl Synthesizer {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Summary paragraph
    ///
    /// Clauses always come in the same order: observation count, recurring
    /// themes, difficult hours (only if any), overall intensity.
    pub fn summary_text(&self, patterns: &PatternSummary) -> String {
        let total = patterns.total_observations;
        let mut sentences: Vec<String> = Vec::with_capacity(3);

        let themes = if patterns.recurring_tags.is_empty() {
            match self.locale {
                Locale::Fr => "aucun thème dominant n'a été identifié.".to_string(),
                Locale::En => "no dominant theme was identified.".to_string(),
            }
        } else {
            let tags = patterns.recurring_tags.join(", ");
            match self.locale {
                Locale::Fr => format!("les thèmes suivants reviennent régulièrement : {tags}."),
                Locale::En => format!("the following themes recur regularly: {tags}."),
            }
        };
        sentences.push(match self.locale {
            Locale::Fr => format!("Sur les {total} observations analysées, {themes}"),
            Locale::En => format!("Across the {total} observations analysed, {themes}"),
        });

        if !patterns.difficult_hours.is_empty() {
            let hours = self.format_hours(&patterns.difficult_hours);
            sentences.push(match self.locale {
                Locale::Fr => format!(
                    "Les moments nécessitant une attention particulière semblent se situer vers {hours}."
                ),
                Locale::En => {
                    format!("Moments needing particular attention seem to fall around {hours}.")
                }
            });
        }

        let closing = if patterns.high_intensity_count > MARKED_INTENSITY_EPISODES {
            match self.locale {
                Locale::Fr => "Quelques épisodes d'intensité marquée ont été notés.",
                Locale::En => "A few episodes of marked intensity were noted.",
            }
        } else {
            match self.locale {
                Locale::Fr => "L'ensemble reste globalement stable.",
                Locale::En => "Overall, things remain stable.",
            }
        };
        sentences.push(closing.to_string());

        sentences.join(" ")
    }

    /// Suggestions in rule order, or the single fallback when none apply
    pub fn suggestions(&self, patterns: &PatternSummary) -> Vec<String> {
        let mut suggestions: Vec<String> = SUGGESTION_RULES
            .iter()
            .filter(|rule| (rule.applies)(patterns))
            .map(|rule| rule.wording.text(self.locale).to_string())
            .collect();

        if suggestions.is_empty() {
            suggestions.push(FALLBACK_SUGGESTION.text(self.locale).to_string());
        }

        suggestions
    }

    /// Both texts for one pattern summary
    pub fn synthesize(&self, patterns: PatternSummary) -> Synthesis {
        let summary = self.summary_text(&patterns);
        let suggestions = self.suggestions(&patterns);
        Synthesis {
            patterns,
            summary,
            suggestions,
        }
    }

    fn format_hours(&self, hours: &[u32]) -> String {
        let joiner = match self.locale {
            Locale::Fr => " et ",
            Locale::En => " and ",
        };
        hours
            .iter()
            .map(|h| format!("{h}h"))
            .collect::<Vec<_>>()
            .join(joiner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn patterns(tags: &[&str], hours: &[u32], high: u32, total: u32) -> PatternSummary {
        PatternSummary {
            recurring_tags: tags.iter().map(|t| t.to_string()).collect(),
            difficult_hours: hours.to_vec(),
            high_intensity_count: high,
            total_observations: total,
        }
    }

    #[test]
    fn test_summary_without_patterns() {
        let text = Synthesizer::default().summary_text(&patterns(&[], &[], 0, 4));

        assert_eq!(
            text,
            "Sur les 4 observations analysées, aucun thème dominant n'a été identifié. \
             L'ensemble reste globalement stable."
        );
    }

    #[test]
    fn test_summary_with_all_clauses() {
        let text =
            Synthesizer::default().summary_text(&patterns(&["fatigue", "colère"], &[14, 18], 3, 12));

        assert_eq!(
            text,
            "Sur les 12 observations analysées, les thèmes suivants reviennent régulièrement : \
             fatigue, colère. Les moments nécessitant une attention particulière semblent se \
             situer vers 14h et 18h. Quelques épisodes d'intensité marquée ont été notés."
        );
    }

    #[test]
    fn test_summary_in_english() {
        let text = Synthesizer::new(Locale::En).summary_text(&patterns(&[], &[9, 18], 1, 5));

        assert_eq!(
            text,
            "Across the 5 observations analysed, no dominant theme was identified. \
             Moments needing particular attention seem to fall around 9h and 18h. \
             Overall, things remain stable."
        );
    }

    #[test]
    fn test_two_intense_episodes_is_still_stable() {
        let text = Synthesizer::new(Locale::En).summary_text(&patterns(&[], &[], 2, 5));
        assert!(text.ends_with("Overall, things remain stable."));

        let text = Synthesizer::new(Locale::En).summary_text(&patterns(&[], &[], 3, 5));
        assert!(text.ends_with("A few episodes of marked intensity were noted."));
    }

    #[test]
    fn test_fallback_only_when_nothing_fires() {
        let synth = Synthesizer::default();

        assert_eq!(
            synth.suggestions(&patterns(&["jeu"], &[], 0, 3)),
            vec!["Continuer l'observation régulière pour affiner l'analyse."]
        );
        let fired = synth.suggestions(&patterns(&["fatigue"], &[], 0, 3));
        assert_eq!(
            fired,
            vec!["Vérifier si le rythme de sommeil ou les temps de repos sont suffisants."]
        );
    }

    #[test]
    fn test_all_rules_fire_in_order() {
        let suggestions =
            Synthesizer::new(Locale::En).suggestions(&patterns(&["Frustration", "fatigue"], &[17], 0, 9));

        assert_eq!(
            suggestions,
            vec![
                "Consider calm or transition periods before the times identified as sensitive.",
                "Check whether sleep patterns and rest periods are sufficient.",
                "Observe the potential triggers preceding these emotions.",
            ]
        );
    }

    #[test]
    fn test_synthesize_is_deterministic() {
        let p = patterns(&["colère"], &[18], 4, 10);
        let synth = Synthesizer::default();

        assert_eq!(synth.synthesize(p.clone()), synth.synthesize(p));
    }
}
