//! 实验结果.

use crate::algos::Profile;
use std::io::{self, Write};

/// 将 `profile` 的结果写进 `w` 中.
fn describe_into<W: Write>(name: &str, p: &Profile, w: &mut W) -> io::Result<()> {
    const S4: &str = "    ";

    #[inline]
    fn f64_to_display(f: Option<f64>) -> String {
        match f {
            Some(f) => format!("{f:.3}"),
            None => "/".to_string(),
        }
    }

    writeln!(w, "Profile `{name}`:")?;
    writeln!(w, "{S4}Runs: {} ({} stopped early)", p.get_runs(), p.get_stopped())?;
    writeln!(w, "{S4}Accepted voxels: {}", p.get_accepted())?;
    writeln!(w, "{S4}Visited voxels: {}", p.get_visited())?;
    writeln!(w, "{S4}Growing time: {} us", p.get_grow_time_us())?;
    writeln!(
        w,
        "{S4}Average growing time: {} us",
        f64_to_display(p.get_avg_grow_time_us())
    )?;
    writeln!(
        w,
        "{S4}Time per visited voxel: {} ns",
        f64_to_display(p.get_ns_per_visit())
    )?;
    writeln!(w, "{S4}Total machine time: {} us", p.get_real_time_us())?;
    let t = p.get_most_time_consuming().map(|d| d.as_micros());
    match t {
        Some(t) => write!(w, "{S4}Most time-consuming run costs {t} us")?,
        None => write!(w, "{S4}Most time-consuming run costs / us")?,
    }
    Ok(())
}

/// 消融实验最终结果.
pub struct AblationResult {
    size: usize,
    data: Vec<(&'static str, Profile)>,
}

impl AblationResult {
    pub fn new<I: IntoIterator<Item = (&'static str, Profile)>>(size: usize, it: I) -> Self {
        Self {
            size,
            data: it.into_iter().collect(),
        }
    }

    /// 将分析结果写进 `w` 中.
    pub fn analyze_into<W: Write>(&self, mut w: W) -> io::Result<()> {
        utils::sep_to(&mut w)?;
        writeln!(w, "Phantom size: {0} x {0} x {0}", self.size)?;
        utils::sep_to(&mut w)?;
        for (key, profile) in self.data.iter() {
            describe_into(key, profile, &mut w)?;
            writeln!(w)?;
            utils::sep_to(&mut w)?;
        }
        Ok(())
    }

    /// 分析运行结果.
    pub fn analyze(&self) -> io::Result<()> {
        self.analyze_into(io::stdout().lock())
    }
}
