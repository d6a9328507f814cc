//! Edit-distance suggestions for unknown ticker input.

pub const DEFAULT_MAX_DISTANCE: usize = 3;

/// Levenshtein distance with unit insert, delete and substitute costs.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (m, n) = (a.len(), b.len());

    let mut dp = vec![vec![0usize; n + 1]; m + 1];
    for (i, row) in dp.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=n {
        dp[0][j] = j;
    }

    for i in 1..=m {
        for j in 1..=n {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            dp[i][j] = (dp[i - 1][j] + 1)
                .min(dp[i][j - 1] + 1)
                .min(dp[i - 1][j - 1] + cost);
        }
    }

    dp[m][n]
}

/// Candidates strictly closer than `max_distance` to the upper-cased input,
/// in candidate order.
pub fn suggest<S: AsRef<str>>(input: &str, candidates: &[S], max_distance: usize) -> Vec<String> {
    let needle = input.trim().to_uppercase();
    candidates
        .iter()
        .map(AsRef::as_ref)
        .filter(|c| levenshtein(&needle, c) < max_distance)
        .map(str::to_string)
        .collect()
}
