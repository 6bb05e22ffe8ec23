// Fuzzy matching for "did you mean" suggestions

/// Levenshtein distance: minimum number of single-character insertions,
/// deletions or substitutions turning `a` into `b`
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Two rolling rows of the edit-distance matrix
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1)  // deletion
                .min(curr[j] + 1)            // insertion
                .min(prev[j] + cost);        // substitution
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Closest candidate within `max_distance` (case-insensitive); ties go to the earlier candidate
pub fn closest_match<'a>(input: &str, candidates: &[&'a str], max_distance: usize) -> Option<&'a str> {
    let input = input.to_lowercase();
    let mut best: Option<(&'a str, usize)> = None;

    for candidate in candidates {
        let distance = levenshtein_distance(&input, &candidate.to_lowercase());
        if distance > max_distance {
            continue;
        }
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((candidate, distance)),
        }
    }

    best.map(|(name, _)| name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_distance() {
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
        assert_eq!(levenshtein_distance("", "abc"), 3);
        assert_eq!(levenshtein_distance("abc", ""), 3);
        assert_eq!(levenshtein_distance("", ""), 0);
        assert_eq!(levenshtein_distance("same", "same"), 0);
        assert_eq!(levenshtein_distance("urgncy", "urgency"), 1);
    }

    #[test]
    fn test_closest_match() {
        let fields = ["due", "urgency", "effort", "parent"];
        assert_eq!(closest_match("urgancy", &fields, 2), Some("urgency"));
        assert_eq!(closest_match("EFORT", &fields, 2), Some("effort"));
        assert_eq!(closest_match("colour", &fields, 2), None);
    }
}
