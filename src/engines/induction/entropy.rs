use crate::data::Row;

/// Label frequencies among `rows[indices]`, in order of first appearance
pub fn label_counts<'a>(rows: &'a [Row], indices: &[usize]) -> Vec<(&'a str, usize)> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for &i in indices {
        let label = rows[i].label.as_str();
        match counts.iter_mut().find(|(l, _)| *l == label) {
            Some((_, c)) => *c += 1,
            None => counts.push((label, 1)),
        }
    }
    counts
}

/// Most frequent label; ties go to the label seen first
pub fn majority_label<'a>(rows: &'a [Row], indices: &[usize]) -> Option<&'a str> {
    let mut best: Option<(&str, usize)> = None;
    for (label, count) in label_counts(rows, indices) {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((label, count));
        }
    }
    best.map(|(label, _)| label)
}

/// Shannon entropy (base 2) of a frequency table
pub fn entropy(counts: impl IntoIterator<Item = usize>) -> f64 {
    let counts: Vec<usize> = counts.into_iter().filter(|&c| c > 0).collect();
    let total: usize = counts.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            -p * p.log2()
        })
        .sum()
}

pub fn partition_entropy(rows: &[Row], indices: &[usize]) -> f64 {
    entropy(label_counts(rows, indices).into_iter().map(|(_, c)| c))
}

/// `H(parent) - Σ |part| / |parent| · H(part)`
pub fn information_gain(rows: &[Row], parent: &[usize], partitions: &[&[usize]]) -> f64 {
    if parent.is_empty() {
        return 0.0;
    }
    let total = parent.len() as f64;
    let remainder: f64 = partitions
        .iter()
        .filter(|p| !p.is_empty())
        .map(|p| (p.len() as f64 / total) * partition_entropy(rows, p))
        .sum();
    partition_entropy(rows, parent) - remainder
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Observation;

    fn rows(labels: &[&str]) -> Vec<Row> {
        labels.iter().map(|l| Row::new(*l, Observation::new())).collect()
    }

    #[test]
    fn test_entropy_of_even_split_is_one_bit() {
        assert!((entropy([2, 2]) - 1.0).abs() < 1e-12);
        assert_eq!(entropy([5]), 0.0);
        assert_eq!(entropy([]), 0.0);
    }

    #[test]
    fn test_majority_tie_goes_to_first_seen() {
        let rows = rows(&["B", "A", "A", "B"]);
        assert_eq!(majority_label(&rows, &[0, 1, 2, 3]), Some("B"));
        assert_eq!(majority_label(&rows, &[1, 2, 3]), Some("A"));
    }

    #[test]
    fn test_perfect_split_gains_full_entropy() {
        let rows = rows(&["X", "X", "Y", "Y"]);
        let gain = information_gain(&rows, &[0, 1, 2, 3], &[&[0, 1], &[2, 3]]);
        assert!((gain - 1.0).abs() < 1e-12);
    }
}
