use std::fmt;

/// Fixed branch category labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BranchLabel {
    Cse,
    It,
    Ece,
    Eee,
    Mech,
    Civil,
    Other,
}

impl BranchLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            BranchLabel::Cse => "CSE",
            BranchLabel::It => "IT",
            BranchLabel::Ece => "ECE",
            BranchLabel::Eee => "EEE",
            BranchLabel::Mech => "MECH",
            BranchLabel::Civil => "CIVIL",
            BranchLabel::Other => "OTHER",
        }
    }
}

impl fmt::Display for BranchLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keyword lists checked in fixed priority order. Branch names can
/// satisfy several lists ("Information Science" also contains
/// "science"), so CSE is checked before IT, IT before ECE, and so on;
/// the first matching label wins.
const KEYWORDS: &[(BranchLabel, &[&str])] = &[
    (
        BranchLabel::Cse,
        &[
            "computer science",
            "cse",
            "computer engineering",
            "artificial intelligence",
            "machine learning",
            "data science",
        ],
    ),
    (
        BranchLabel::It,
        &["information science", "information technology"],
    ),
    (
        BranchLabel::Ece,
        &["electronics", "telecommunication", "ece"],
    ),
    (BranchLabel::Eee, &["electrical", "eee"]),
    (BranchLabel::Mech, &["mechanical", "mech"]),
    (BranchLabel::Civil, &["civil"]),
];

/// Map a free-text branch name to its category label.
///
/// Total and deterministic: case-insensitive substring match against the
/// priority-ordered keyword lists, `Other` when nothing matches.
pub fn classify_branch(name: &str) -> BranchLabel {
    let lowered = name.to_lowercase();
    for (label, keywords) in KEYWORDS {
        if keywords.iter().any(|k| lowered.contains(k)) {
            return *label;
        }
    }
    BranchLabel::Other
}

/// Compiled-in guidance profile for one branch category.
#[derive(Debug)]
pub struct BranchProfile {
    pub label: BranchLabel,
    pub skills: &'static [&'static str],
    pub interests: &'static [&'static str],
    pub careers: &'static [&'static str],
    pub average_package: &'static str,
    pub description: &'static str,
}

pub const BRANCH_PROFILES: [BranchProfile; 6] = [
    BranchProfile {
        label: BranchLabel::Cse,
        skills: &["programming", "algorithms", "problem solving", "databases"],
        interests: &["coding", "software", "ai", "gaming", "apps", "technology"],
        careers: &["Software Engineer", "Data Scientist", "ML Engineer", "Product Engineer"],
        average_package: "6-12 LPA",
        description: "Computer Science focuses on software systems, algorithms and \
                      computation; the widest door into the software industry.",
    },
    BranchProfile {
        label: BranchLabel::It,
        skills: &["web development", "networking", "databases", "system administration"],
        interests: &["internet", "web", "coding", "networks", "apps", "security"],
        careers: &["Full-Stack Developer", "Network Engineer", "DevOps Engineer", "IT Consultant"],
        average_package: "5-10 LPA",
        description: "Information Science applies computing to information systems, \
                      networks and enterprise software.",
    },
    BranchProfile {
        label: BranchLabel::Ece,
        skills: &["circuit design", "signal processing", "embedded systems", "mathematics"],
        interests: &["electronics", "gadgets", "communication", "robotics", "chips"],
        careers: &["Embedded Engineer", "VLSI Designer", "Telecom Engineer", "IoT Developer"],
        average_package: "4-9 LPA",
        description: "Electronics and Communication covers circuits, semiconductors \
                      and the systems that move signals around the world.",
    },
    BranchProfile {
        label: BranchLabel::Eee,
        skills: &["power systems", "control systems", "circuit analysis", "machines"],
        interests: &["electricity", "power", "motors", "energy", "automation"],
        careers: &["Power Engineer", "Control Engineer", "Electrical Designer", "Grid Analyst"],
        average_package: "4-8 LPA",
        description: "Electrical and Electronics deals with power generation, \
                      transmission, machines and control.",
    },
    BranchProfile {
        label: BranchLabel::Mech,
        skills: &["thermodynamics", "CAD", "manufacturing", "mechanics"],
        interests: &["machines", "cars", "design", "manufacturing", "robotics"],
        careers: &["Design Engineer", "Production Engineer", "Automotive Engineer", "R&D Engineer"],
        average_package: "3.5-8 LPA",
        description: "Mechanical Engineering is the broadest core branch: design, \
                      thermal systems, manufacturing and automotive work.",
    },
    BranchProfile {
        label: BranchLabel::Civil,
        skills: &["structural analysis", "surveying", "construction management", "materials"],
        interests: &["construction", "buildings", "infrastructure", "design", "environment"],
        careers: &["Structural Engineer", "Site Engineer", "Urban Planner", "Project Manager"],
        average_package: "3.5-7 LPA",
        description: "Civil Engineering builds and maintains infrastructure: \
                      structures, transportation, water and environment.",
    },
];

pub fn profile_for(label: BranchLabel) -> Option<&'static BranchProfile> {
    BRANCH_PROFILES.iter().find(|p| p.label == label)
}

/// Recommend up to three branches for a set of user interest tags.
///
/// A branch's match score counts every (user tag, branch tag) pair where
/// one is a case-insensitive substring of the other. One user tag can
/// therefore add to the score several times; that double counting is
/// intentional and kept from the original scoring scheme. Branches with
/// score zero are dropped; ties keep the profile table order.
pub fn recommend(tags: &[String]) -> Vec<(&'static BranchProfile, usize)> {
    if tags.is_empty() {
        return Vec::new();
    }
    let lowered: Vec<String> = tags.iter().map(|t| t.trim().to_lowercase()).collect();

    let mut scored: Vec<(&'static BranchProfile, usize)> = BRANCH_PROFILES
        .iter()
        .map(|profile| {
            let score = lowered
                .iter()
                .filter(|tag| !tag.is_empty())
                .map(|tag| {
                    profile
                        .interests
                        .iter()
                        .filter(|interest| tag.contains(*interest) || interest.contains(tag.as_str()))
                        .count()
                })
                .sum();
            (profile, score)
        })
        .filter(|(_, score)| *score > 0)
        .collect();

    // Stable sort keeps table insertion order on equal scores.
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored.truncate(3);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifier_maps_common_branch_names() {
        assert_eq!(classify_branch("Computer Science and Engineering"), BranchLabel::Cse);
        assert_eq!(classify_branch("Civil Engineering"), BranchLabel::Civil);
        assert_eq!(classify_branch("Basket Weaving"), BranchLabel::Other);
    }

    #[test]
    fn classifier_priority_order_disambiguates() {
        // "Information Science and Engineering" must not fall into CSE,
        // "Electronics and Communication" must resolve before EEE.
        assert_eq!(classify_branch("Information Science and Engineering"), BranchLabel::It);
        assert_eq!(classify_branch("Electronics and Communication Engineering"), BranchLabel::Ece);
        assert_eq!(classify_branch("Electrical and Electronics Engineering"), BranchLabel::Eee);
        assert_eq!(classify_branch("MECHANICAL ENGINEERING"), BranchLabel::Mech);
    }

    #[test]
    fn classifier_is_deterministic() {
        for name in ["CSE Engg", "Mechatronics", "", "  "] {
            assert_eq!(classify_branch(name), classify_branch(name));
        }
    }

    #[test]
    fn every_label_except_other_has_a_profile() {
        use BranchLabel::*;
        for label in [Cse, It, Ece, Eee, Mech, Civil] {
            assert!(profile_for(label).is_some());
        }
        assert!(profile_for(Other).is_none());
    }

    #[test]
    fn empty_interests_give_empty_recommendation() {
        assert!(recommend(&[]).is_empty());
    }

    #[test]
    fn exact_tag_match_scores_at_least_one() {
        let tags = vec!["robotics".to_string()];
        let results = recommend(&tags);
        assert!(results
            .iter()
            .any(|(profile, score)| profile.label == BranchLabel::Ece && *score >= 1));
    }

    #[test]
    fn recommendation_is_sorted_and_capped_at_three() {
        let tags = vec![
            "coding".to_string(),
            "design".to_string(),
            "robotics".to_string(),
            "power".to_string(),
        ];
        let results = recommend(&tags);
        assert!(results.len() <= 3);
        for pair in results.windows(2) {
            assert!(pair[0].1 >= pair[1].1);
        }
    }

    #[test]
    fn unmatched_tags_are_excluded() {
        let tags = vec!["basket weaving".to_string()];
        assert!(recommend(&tags).is_empty());
    }
}
