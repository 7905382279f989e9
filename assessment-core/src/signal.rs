//! Rule-based query signals
//!
//! Tags a query with technical skills, soft skills, experience level and
//! focus areas using fixed keyword rules over lower-cased text. The same
//! skill rules index the catalog once at load time so the ranker can boost
//! items mentioning a requested skill.

use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use crate::catalog::Catalog;

/// Technical skill tag -> pattern over lower-cased text
const TECHNICAL_RULES: &[(&str, &str)] = &[
    ("python", r"\bpython\b"),
    ("java", r"\bjava\b"),
    ("sql", r"\bsql\b|mysql|postgres"),
    ("javascript", r"javascript|\bjs\b|node\.?js|typescript"),
    ("c++", r"c\+\+|\bcpp\b"),
    ("react", r"\breact(\.?js)?\b"),
    ("angular", r"\bangular(js)?\b"),
    ("cloud-platform", r"\b(aws|azure|gcp|google cloud|cloud)\b"),
    ("containerization", r"\b(docker|containers?|containeri[sz]ation)\b"),
    ("orchestration", r"\b(kubernetes|k8s|orchestration)\b"),
    ("api", r"\b(apis?|rest(ful)?|graphql)\b"),
];

const SOFT_RULES: &[(&str, &str)] = &[
    ("communication", r"\bcommunicat"),
    ("leadership", r"\blead(er|ers|ership|ing)?\b"),
    ("teamwork", r"\bteam|\bcollaborat"),
    ("problem-solving", r"problem[- ]solv"),
    ("critical-thinking", r"critical[- ]thinking|\banalytical\b"),
];

const FOCUS_RULES: &[(&str, &str)] = &[
    (
        "frontend",
        r"\bfront[- ]?end\b|\bui\b|\bux\b|\bcss\b|\bhtml\b|\breact\b|\bangular\b",
    ),
    (
        "backend",
        r"\bback[- ]?end\b|\bserver[- ]side\b|\bdatabases?\b|\bmicroservices?\b|\bapis?\b",
    ),
    (
        "devops",
        r"\bdevops\b|\bci/cd\b|\bdocker\b|\bkubernetes\b|\binfrastructure\b|\bdeployments?\b",
    ),
    (
        "data",
        r"\bdata\b|\banalytics?\b|\bmachine learning\b|\bstatistic|\bml\b",
    ),
];

/// A years-of-experience figure followed by "+", e.g. "5+ years"
const YEARS_PLUS: &str = r"\b(\d+)\s*\+";
const SENIOR_YEARS: u64 = 5;

/// Seniority implied by the query
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    Junior,
    #[default]
    Mid,
    Senior,
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Junior => "junior",
            Self::Mid => "mid",
            Self::Senior => "senior",
        };
        f.write_str(s)
    }
}

/// Keyword tags extracted from one query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QuerySignal {
    pub technical_skills: BTreeSet<&'static str>,
    pub soft_skills: BTreeSet<&'static str>,
    pub experience_level: ExperienceLevel,
    pub focus_areas: BTreeSet<&'static str>,
}

impl QuerySignal {
    /// Technical and soft skills together, the tags that drive boosting
    pub fn skills(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.technical_skills
            .iter()
            .chain(self.soft_skills.iter())
            .copied()
    }

    pub fn has_skills(&self) -> bool {
        !self.technical_skills.is_empty() || !self.soft_skills.is_empty()
    }

    /// Original text followed by one labeled line per non-empty field
    pub fn enhanced_query(&self, original: &str) -> String {
        let mut lines = vec![original.trim().to_string()];
        lines.extend(labeled("Technical", &self.technical_skills));
        lines.extend(labeled("Soft skills", &self.soft_skills));
        lines.push(format!("Experience: {}", self.experience_level));
        lines.extend(labeled("Focus", &self.focus_areas));
        lines.join("\n")
    }
}

fn labeled(label: &str, values: &BTreeSet<&'static str>) -> Option<String> {
    if values.is_empty() {
        return None;
    }
    let joined: Vec<&str> = values.iter().copied().collect();
    Some(format!("{}: {}", label, joined.join(", ")))
}

struct Rule {
    tag: &'static str,
    pattern: Regex,
}

fn compile(rules: &[(&'static str, &str)]) -> Vec<Rule> {
    rules
        .iter()
        .filter_map(|(tag, pattern)| match Regex::new(pattern) {
            Ok(pattern) => Some(Rule { tag: *tag, pattern }),
            Err(e) => {
                log::warn!("Skipping keyword rule {}: {}", tag, e);
                None
            }
        })
        .collect()
}

fn matching_tags(rules: &[Rule], text: &str) -> BTreeSet<&'static str> {
    rules
        .iter()
        .filter(|rule| rule.pattern.is_match(text))
        .map(|rule| rule.tag)
        .collect()
}

/// Compiled keyword rules. Build once, share freely.
pub struct SkillExtractor {
    technical: Vec<Rule>,
    soft: Vec<Rule>,
    focus: Vec<Rule>,
    years_plus: Option<Regex>,
}

impl Default for SkillExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl SkillExtractor {
    pub fn new() -> Self {
        Self {
            technical: compile(TECHNICAL_RULES),
            soft: compile(SOFT_RULES),
            focus: compile(FOCUS_RULES),
            years_plus: Regex::new(YEARS_PLUS).ok(),
        }
    }

    /// Tag `text`. Pure: no state, no I/O.
    pub fn extract(&self, text: &str) -> QuerySignal {
        let text = text.to_lowercase();
        QuerySignal {
            technical_skills: matching_tags(&self.technical, &text),
            soft_skills: matching_tags(&self.soft, &text),
            experience_level: self.experience_level(&text),
            focus_areas: matching_tags(&self.focus, &text),
        }
    }

    fn experience_level(&self, text: &str) -> ExperienceLevel {
        let many_years = self.years_plus.as_ref().is_some_and(|re| {
            // The capture is all digits, so a parse failure means overflow
            re.captures_iter(text).any(|caps| {
                caps[1]
                    .parse::<u64>()
                    .map_or(true, |years| years >= SENIOR_YEARS)
            })
        });

        if text.contains("senior") || many_years {
            ExperienceLevel::Senior
        } else if text.contains("junior") || text.contains("entry") || text.contains("graduate") {
            ExperienceLevel::Junior
        } else {
            ExperienceLevel::Mid
        }
    }

    /// Skill tags (technical and soft) found in arbitrary text
    fn skill_tags(&self, text: &str) -> BTreeSet<&'static str> {
        let mut tags = matching_tags(&self.technical, text);
        tags.extend(matching_tags(&self.soft, text));
        tags
    }
}

/// Skill tag -> catalog positions whose name or url mentions it.
///
/// Built once per catalog; read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct SkillIndex {
    positions: HashMap<&'static str, HashSet<usize>>,
}

impl SkillIndex {
    pub fn build(catalog: &Catalog, extractor: &SkillExtractor) -> Self {
        let mut positions: HashMap<&'static str, HashSet<usize>> = HashMap::new();
        for item in catalog.items() {
            for tag in extractor.skill_tags(&item.searchable_text()) {
                positions.entry(tag).or_default().insert(item.position);
            }
        }
        log::debug!("Built skill index: {} tags", positions.len());
        Self { positions }
    }

    /// Positions tagged with `tag`
    pub fn positions(&self, tag: &str) -> Option<&HashSet<usize>> {
        self.positions.get(tag)
    }

    /// True when the item at `position` carries any skill in `signal`
    pub fn matches(&self, position: usize, signal: &QuerySignal) -> bool {
        signal.skills().any(|tag| {
            self.positions
                .get(tag)
                .is_some_and(|set| set.contains(&position))
        })
    }

    pub fn tag_count(&self) -> usize {
        self.positions.len()
    }
}
