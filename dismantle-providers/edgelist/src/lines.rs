//! Line tokenizer shared by the edge-list and ranking readers.

use std::io::BufRead;

use crate::errors::EdgeListProviderError;

/// Calls `visit` with the one-based line number, the trimmed line and its
/// tokens for every data line. Blank lines and lines starting with `#` or
/// `%` are skipped.
pub(crate) fn for_each_record<R, F>(reader: R, mut visit: F) -> Result<usize, EdgeListProviderError>
where
    R: BufRead,
    F: FnMut(usize, &str, &[&str]) -> Result<(), EdgeListProviderError>,
{
    let mut records = 0;
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with(['#', '%']) {
            continue;
        }
        let tokens: Vec<&str> = trimmed
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|token| !token.is_empty())
            .collect();
        visit(index + 1, trimmed, &tokens)?;
        records += 1;
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("1 2\n", vec![vec!["1", "2"]])]
    #[case("1,2\n3,\t4\n", vec![vec!["1", "2"], vec!["3", "4"]])]
    #[case("# comment\n\n% konect header\n5\t6\t0.5\n", vec![vec!["5", "6", "0.5"]])]
    fn splits_on_whitespace_and_commas(#[case] raw: &str, #[case] expected: Vec<Vec<&str>>) {
        let mut seen = Vec::new();
        let records = for_each_record(Cursor::new(raw), |_, _, tokens| {
            seen.push(tokens.iter().map(|t| (*t).to_owned()).collect::<Vec<_>>());
            Ok(())
        })
        .expect("input is readable");
        assert_eq!(records, expected.len());
        assert_eq!(seen, expected);
    }

    #[rstest]
    fn reports_one_based_line_numbers() {
        let mut numbers = Vec::new();
        for_each_record(Cursor::new("# skip\n1 2\n\n3 4\n"), |line, _, _| {
            numbers.push(line);
            Ok(())
        })
        .expect("input is readable");
        assert_eq!(numbers, vec![2, 4]);
    }
}
