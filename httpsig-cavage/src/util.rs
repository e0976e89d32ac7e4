/// Remove duplicated header names, compared case-insensitively after trimming.
/// The first occurrence keeps its position and spelling.
pub(crate) fn dedup_header_names<I, S>(iter: I) -> Vec<String>
where
  I: IntoIterator<Item = S>,
  S: AsRef<str>,
{
  let mut uniq = rustc_hash::FxHashSet::default();
  iter
    .into_iter()
    .filter(|name| uniq.insert(normalize_header_name(name.as_ref())))
    .map(|name| name.as_ref().to_string())
    .collect()
}

/// Normalize a header name as it appears in a signing string and in the `headers` parameter
pub(crate) fn normalize_header_name(name: &str) -> String {
  name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn dedup_keeps_first_occurrence() {
    let deduped = dedup_header_names(["(request-target)", "Date", "X2", "date", " x2 "]);
    assert_eq!(deduped, vec!["(request-target)", "Date", "X2"]);
  }

  #[test]
  fn normalize_trims_and_lowercases() {
    assert_eq!(normalize_header_name("  Content-Type "), "content-type");
  }
}
