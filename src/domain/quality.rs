use super::QualityResult;

/// OK/NOK tallies kept on a production stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QualityCounters {
    pub ok: i32,
    pub nok: i32,
}

impl QualityCounters {
    pub fn new(ok: i32, nok: i32) -> Self {
        Self { ok, nok }
    }

    /// Counts one check. Rework results leave both counters untouched.
    pub fn apply(self, result: QualityResult) -> Self {
        match result {
            QualityResult::Ok => Self { ok: self.ok + 1, ..self },
            QualityResult::Nok => Self { nok: self.nok + 1, ..self },
            QualityResult::Rework => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_ok_and_nok() {
        let counters = QualityCounters::new(2, 1)
            .apply(QualityResult::Ok)
            .apply(QualityResult::Nok)
            .apply(QualityResult::Nok);
        assert_eq!(counters, QualityCounters::new(3, 3));
    }

    #[test]
    fn rework_is_neutral() {
        let start = QualityCounters::new(4, 0);
        assert_eq!(start.apply(QualityResult::Rework), start);
    }
}
