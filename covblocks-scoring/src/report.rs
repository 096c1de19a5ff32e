use std::io::Write;

use crate::config::Directionality;
use crate::consts::REPORT_COLUMNS;
use crate::feature::FeatureCategory;
use crate::scorer::{ReportRow, format_float};

///
/// Intron depth summed per QC category.
///
/// One of these is kept per scoring shard and the shards are reduced in order
/// afterwards, so no counter is shared between workers.
///
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct QcSums {
    pub clean: f64,
    pub known_exon: f64,
    /// Only accumulated for non-directional scoring.
    pub anti_sense: f64,
}

impl QcSums {
    pub fn add(&mut self, category: FeatureCategory, intron_depth: f64, directionality: Directionality) {
        match category {
            FeatureCategory::Clean => self.clean += intron_depth,
            FeatureCategory::KnownExon => self.known_exon += intron_depth,
            FeatureCategory::Other if !directionality.is_directional() => {
                self.anti_sense += intron_depth
            }
            FeatureCategory::Other => {}
        }
    }

    pub fn merge(&mut self, other: &QcSums) {
        self.clean += other.clean;
        self.known_exon += other.known_exon;
        self.anti_sense += other.anti_sense;
    }
}

///
/// Rows in input order plus the QC sums of a scoring run.
///
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringReport {
    pub directionality: Directionality,
    pub rows: Vec<ReportRow>,
    pub qc: QcSums,
}

impl ScoringReport {
    pub fn header(&self) -> String {
        let chrom_column = if self.directionality.is_directional() {
            "Dir_Chr"
        } else {
            "Nondir_Chr"
        };
        format!("{}\t{}", chrom_column, REPORT_COLUMNS.join("\t"))
    }

    /// Write the header line then one line per row.
    pub fn write_report<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writeln!(writer, "{}", self.header())?;
        for row in &self.rows {
            writeln!(writer, "{row}")?;
        }
        Ok(())
    }

    pub fn write_qc<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        if self.directionality.is_directional() {
            writeln!(writer, "Directional Clean IntronDepth Sum\t{}", format_float(self.qc.clean))?;
            writeln!(
                writer,
                "Directional Known-Exon IntronDepth Sum\t{}",
                format_float(self.qc.known_exon)
            )?;
        } else {
            writeln!(
                writer,
                "Non-Directional Clean IntronDepth Sum\t{}",
                format_float(self.qc.clean)
            )?;
            writeln!(
                writer,
                "Non-Directional Known-Exon IntronDepth Sum\t{}",
                format_float(self.qc.known_exon)
            )?;
            writeln!(
                writer,
                "Non-Directional Anti-Sense IntronDepth Sum\t{}",
                format_float(self.qc.anti_sense)
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_qc_sums_skip_anti_sense_when_directional() {
        let mut nd = QcSums::default();
        let mut dir = QcSums::default();
        for (category, depth) in [
            (FeatureCategory::Clean, 2.0),
            (FeatureCategory::KnownExon, 1.5),
            (FeatureCategory::Other, 4.0),
        ] {
            nd.add(category, depth, Directionality::NonDirectional);
            dir.add(category, depth, Directionality::Reverse);
        }
        assert_eq!(nd, QcSums { clean: 2.0, known_exon: 1.5, anti_sense: 4.0 });
        assert_eq!(dir, QcSums { clean: 2.0, known_exon: 1.5, anti_sense: 0.0 });
    }

    #[rstest]
    #[case(Directionality::NonDirectional, "Non-Directional Clean IntronDepth Sum\t3\nNon-Directional Known-Exon IntronDepth Sum\t0.5\nNon-Directional Anti-Sense IntronDepth Sum\t0\n")]
    #[case(Directionality::Forward, "Directional Clean IntronDepth Sum\t3\nDirectional Known-Exon IntronDepth Sum\t0.5\n")]
    fn test_write_qc(#[case] directionality: Directionality, #[case] expected: &str) {
        let report = ScoringReport {
            directionality,
            rows: vec![],
            qc: QcSums { clean: 3.0, known_exon: 0.5, anti_sense: 0.0 },
        };
        let mut out = Vec::new();
        report.write_qc(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }

    #[rstest]
    fn test_header() {
        let report = ScoringReport {
            directionality: Directionality::NonDirectional,
            rows: vec![],
            qc: QcSums::default(),
        };
        let header = report.header();
        assert!(header.starts_with("Nondir_Chr\tStart\tEnd\tName\tNull\tStrand\t"));
        assert!(header.ends_with("\tIRratio\tWarnings"));
        assert_eq!(header.split('\t').count(), 21);
    }
}
