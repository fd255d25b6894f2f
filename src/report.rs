//! Text serialization of [`FunctionProfile`]s.
//!
//! Fractions are printed with `{:.N}`, which rounds the exact binary value of the `f64` to the
//! nearest representable decimal and breaks exact ties to even, like `printf("%.3f")` does.

use std::io::{self, Write};

use crate::{analysis::instruction_mix::FunctionProfile, OutputFormat};

/// `name, count, int, float, mem, biased, unbiased, other`.
pub fn format_csv(profile: &FunctionProfile, precision: usize) -> String {
    let mut line = format!("{}, {}", profile.name, profile.dynamic_op_count);
    for frac in profile.fractions() {
        line.push_str(&format!(", {:.*}", precision, frac));
    }
    line
}

pub fn format_json(profile: &FunctionProfile) -> serde_json::Result<String> {
    serde_json::to_string(profile)
}

pub fn write_profile<W: Write>(
    w: &mut W,
    profile: &FunctionProfile,
    format: OutputFormat,
    precision: usize,
) -> io::Result<()> {
    match format {
        OutputFormat::Csv => writeln!(w, "{}", format_csv(profile, precision)),
        OutputFormat::Json => {
            serde_json::to_writer(&mut *w, profile)?;
            writeln!(w)
        }
    }
}

pub fn write_profiles<'a, W, I>(w: &mut W, profiles: I, format: OutputFormat, precision: usize) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a FunctionProfile>,
{
    for profile in profiles {
        write_profile(w, profile, format, precision)?;
    }
    w.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::instruction_mix::{Category, CategoryTotals};

    fn profile(name: &str, counts: &[(Category, u64)]) -> FunctionProfile {
        let mut totals = CategoryTotals::new();
        for (category, count) in counts {
            totals.add(*category, *count);
        }
        FunctionProfile::new(name, &totals)
    }

    #[test]
    fn test_csv_line() {
        let p = profile("main", &[(Category::IntAlu, 100), (Category::BiasedBranch, 100)]);
        assert_eq!(
            format_csv(&p, 3),
            "main, 200, 0.500, 0.000, 0.000, 0.500, 0.000, 0.000"
        );
    }

    #[test]
    fn test_csv_rounds_to_precision() {
        let p = profile("f", &[(Category::IntAlu, 1), (Category::Memory, 2)]);
        assert_eq!(
            format_csv(&p, 3),
            "f, 3, 0.333, 0.000, 0.667, 0.000, 0.000, 0.000"
        );
        assert_eq!(format_csv(&p, 1), "f, 3, 0.3, 0.0, 0.7, 0.0, 0.0, 0.0");
    }

    #[test]
    fn test_csv_empty_function() {
        let p = profile("empty", &[]);
        assert_eq!(
            format_csv(&p, 3),
            "empty, 0, 0.000, 0.000, 0.000, 0.000, 0.000, 0.000"
        );
    }

    #[test]
    fn test_json_fields() {
        let p = profile("g", &[(Category::Other, 4)]);
        let value: serde_json::Value = serde_json::from_str(&format_json(&p).unwrap()).unwrap();
        assert_eq!(value["name"], "g");
        assert_eq!(value["dynamic_op_count"], 4);
        assert_eq!(value["other_frac"], 1.0);
        assert_eq!(value["mem_frac"], 0.0);
    }

    #[test]
    fn test_write_profiles_one_line_each() {
        let profiles = vec![
            profile("a", &[(Category::FloatAlu, 1)]),
            profile("b", &[(Category::UnbiasedBranch, 1)]),
        ];
        let mut out = Vec::new();
        write_profiles(&mut out, &profiles, OutputFormat::Csv, 3).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("a, 1, 0.000, 1.000"));
        assert!(lines[1].starts_with("b, 1, "));

        let mut out = Vec::new();
        write_profiles(&mut out, &profiles, OutputFormat::Json, 3).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.lines().all(|line| line.starts_with('{')));
    }
}
