use bytesize::ByteSize;
use core::fmt;
use std::time::Duration;

/// Bytes processed per second, printed with binary units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Throughput(u64);

impl Throughput {
    pub fn from_bytes_per_sec(bytes: u64) -> Self {
        Self(bytes)
    }

    /// Throughput of `bytes` processed in `elapsed`. Zero when no time passed.
    pub fn measure(bytes: u64, elapsed: Duration) -> Self {
        let secs = elapsed.as_secs_f64();
        if secs > 0.0 {
            Self::from_bytes_per_sec((bytes as f64 / secs) as u64)
        } else {
            Self::from_bytes_per_sec(0)
        }
    }
}

impl fmt::Display for Throughput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/s", ByteSize(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(2048, Duration::from_secs(2), 1024)]
    #[case(100, Duration::ZERO, 0)]
    fn measures_bytes_per_second(
        #[case] bytes: u64,
        #[case] elapsed: Duration,
        #[case] expected: u64,
    ) {
        assert_eq!(
            Throughput::measure(bytes, elapsed),
            Throughput::from_bytes_per_sec(expected)
        );
    }
}
