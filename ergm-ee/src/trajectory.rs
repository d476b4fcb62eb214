//! Theta and dzA trajectory output.
//!
//! Two append-only text streams, one line per reported iteration:
//!
//! ```text
//! theta file: t [Arc] <one column per parameter> AcceptanceRate
//! dzA file:   t [Arc] <one column per parameter>
//! ```
//!
//! The `Arc` column is present only under the IFD sampler, which reports
//! the density parameter via its auxiliary parameter rather than theta.

use ergm_graph::io::open_buf_writer;
use ndarray::Array1;
use std::io::Write;

/// Paired theta/dzA trajectory writers.
pub struct TrajectoryFiles {
    theta: Box<dyn Write>,
    dza: Box<dyn Write>,
}

impl TrajectoryFiles {
    /// Open (truncating) the two output files.
    pub fn create(theta_file: &str, dza_file: &str) -> anyhow::Result<Self> {
        Ok(TrajectoryFiles {
            theta: open_buf_writer(theta_file)?,
            dza: open_buf_writer(dza_file)?,
        })
    }

    /// Wrap arbitrary writers (tests, or callers that discard output).
    pub fn from_writers(theta: Box<dyn Write>, dza: Box<dyn Write>) -> Self {
        TrajectoryFiles { theta, dza }
    }

    /// Discard all rows. Used when simulating, where only the final
    /// network matters.
    pub fn sink() -> Self {
        TrajectoryFiles {
            theta: Box::new(std::io::sink()),
            dza: Box::new(std::io::sink()),
        }
    }

    /// Write the column-name header line to both files.
    pub fn write_headers(&mut self, names: &[String], ifd_arc: bool) -> anyhow::Result<()> {
        let mut header = String::from("t");
        if ifd_arc {
            header.push_str(" Arc");
        }
        for name in names {
            header.push(' ');
            header.push_str(name);
        }
        writeln!(self.theta, "{} AcceptanceRate", header)?;
        writeln!(self.dza, "{}", header)?;
        Ok(())
    }

    pub fn theta_row(
        &mut self,
        t: i64,
        ifd_arc: Option<f64>,
        theta: &Array1<f64>,
        acceptance_rate: f64,
    ) -> anyhow::Result<()> {
        write!(self.theta, "{}", t)?;
        if let Some(arc) = ifd_arc {
            write!(self.theta, " {}", arc)?;
        }
        for v in theta.iter() {
            write!(self.theta, " {}", v)?;
        }
        writeln!(self.theta, " {}", acceptance_rate)?;
        Ok(())
    }

    pub fn dza_row(
        &mut self,
        t: i64,
        dz_arc: Option<f64>,
        dza: &Array1<f64>,
    ) -> anyhow::Result<()> {
        write!(self.dza, "{}", t)?;
        if let Some(arc) = dz_arc {
            write!(self.dza, " {}", arc)?;
        }
        for v in dza.iter() {
            write!(self.dza, " {}", v)?;
        }
        writeln!(self.dza)?;
        Ok(())
    }

    pub fn flush(&mut self) -> anyhow::Result<()> {
        self.theta.flush()?;
        self.dza.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_row_format() {
        let theta_file = tempfile::NamedTempFile::new().unwrap();
        let dza_file = tempfile::NamedTempFile::new().unwrap();
        {
            let mut traj = TrajectoryFiles::create(
                theta_file.path().to_str().unwrap(),
                dza_file.path().to_str().unwrap(),
            )
            .unwrap();
            let names = vec!["Reciprocity".to_owned(), "AltInStars".to_owned()];
            traj.write_headers(&names, true).unwrap();
            let theta = Array1::from(vec![0.5, -1.25]);
            traj.theta_row(-3, Some(-2.0), &theta, 0.25).unwrap();
            traj.dza_row(-3, Some(1.0), &theta).unwrap();
            traj.flush().unwrap();
        }

        let mut theta_text = String::new();
        std::fs::File::open(theta_file.path())
            .unwrap()
            .read_to_string(&mut theta_text)
            .unwrap();
        let lines: Vec<&str> = theta_text.lines().collect();
        assert_eq!(lines[0], "t Arc Reciprocity AltInStars AcceptanceRate");
        assert_eq!(lines[1], "-3 -2 0.5 -1.25 0.25");

        let mut dza_text = String::new();
        std::fs::File::open(dza_file.path())
            .unwrap()
            .read_to_string(&mut dza_text)
            .unwrap();
        let lines: Vec<&str> = dza_text.lines().collect();
        assert_eq!(lines[0], "t Arc Reciprocity AltInStars");
        assert_eq!(lines[1], "-3 1 0.5 -1.25");
    }
}
