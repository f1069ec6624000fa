use ml_core::{DataError, Record, SampleSource};

/// Identifies one of the two sources of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Training,
    Validation,
}

impl Source {
    /// Returns the other source.
    pub fn other(self) -> Self {
        match self {
            Source::Training => Source::Validation,
            Source::Validation => Source::Training,
        }
    }
}

/// The record a global index resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub source: Source,
    pub index: usize,
}

/// Decides which source every global index of a pass reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interleave {
    /// Every index reads the pass' primary source.
    #[default]
    Disabled,
    /// Three out of four indices read the primary source and the fourth one reads the
    /// secondary source, the choice depends only on `(index + seed) % 4`.
    CrossValidation { seed: u64 },
}

impl Interleave {
    /// Resolves a global index.
    ///
    /// # Arguments
    /// * `index` - The global index being visited.
    /// * `primary` - The source the pass iterates over.
    /// * `secondary_len` - The amount of records of the other source.
    ///
    /// # Returns
    /// The route to fetch, or `DataError::EmptySource` if the index routes to an empty
    /// secondary source.
    pub fn route(
        &self,
        index: usize,
        primary: Source,
        secondary_len: usize,
    ) -> Result<Route, DataError> {
        let Interleave::CrossValidation { seed } = *self else {
            return Ok(Route {
                source: primary,
                index,
            });
        };

        if (index as u64).wrapping_add(seed) % 4 < 3 {
            return Ok(Route {
                source: primary,
                index,
            });
        }

        if secondary_len == 0 {
            return Err(DataError::EmptySource);
        }

        let index = if index < secondary_len {
            index
        } else {
            index % secondary_len
        };

        Ok(Route {
            source: primary.other(),
            index,
        })
    }
}

/// The training and validation sources of a session.
///
/// Both sources are fetched through this type only, and it is meant to live behind the single
/// lock shared by every worker of a round.
#[derive(Debug)]
pub struct Sources<S: SampleSource> {
    training: S,
    validation: Option<S>,
}

impl<S: SampleSource> Sources<S> {
    /// Creates a new `Sources`.
    ///
    /// # Arguments
    /// * `training` - The training source.
    /// * `validation` - The optional validation source.
    pub fn new(training: S, validation: Option<S>) -> Self {
        Self {
            training,
            validation,
        }
    }

    /// The amount of records of `source`, `0` if it is absent.
    pub fn len_of(&self, source: Source) -> usize {
        match source {
            Source::Training => self.training.len(),
            Source::Validation => self.validation.as_ref().map_or(0, |v| v.len()),
        }
    }

    /// Resolves `index` following `interleave` and fetches the record into `record`.
    ///
    /// # Returns
    /// The route that was fetched or the source's error.
    pub fn fetch(
        &mut self,
        index: usize,
        primary: Source,
        interleave: Interleave,
        record: &mut Record,
    ) -> Result<Route, DataError> {
        let route = interleave.route(index, primary, self.len_of(primary.other()))?;

        let source = match route.source {
            Source::Training => &mut self.training,
            Source::Validation => self.validation.as_mut().ok_or(DataError::EmptySource)?,
        };

        source.get_record(route.index, record)?;
        Ok(route)
    }
}

#[cfg(test)]
mod tests {
    use ml_core::InMemorySource;

    use super::*;

    const CV: Interleave = Interleave::CrossValidation { seed: 0 };

    #[test]
    fn disabled_always_reads_the_primary_source() {
        for i in 0..8 {
            let route = Interleave::Disabled.route(i, Source::Training, 0).unwrap();
            assert_eq!(
                route,
                Route {
                    source: Source::Training,
                    index: i
                }
            );
        }
    }

    #[test]
    fn every_fourth_index_reads_the_secondary_source() {
        let sources: Vec<_> = (0..8)
            .map(|i| CV.route(i, Source::Training, 100).unwrap().source)
            .collect();

        use Source::*;
        assert_eq!(
            sources,
            [
                Training, Training, Training, Validation, Training, Training, Training, Validation
            ]
        );
    }

    #[test]
    fn seed_shifts_the_pattern() {
        let route = Interleave::CrossValidation { seed: 1 }
            .route(2, Source::Training, 10)
            .unwrap();
        assert_eq!(route.source, Source::Validation);
    }

    #[test]
    fn secondary_index_wraps_past_its_length() {
        // (7 + 0) % 4 == 3 and 7 >= 5
        let route = CV.route(7, Source::Training, 5).unwrap();
        assert_eq!(
            route,
            Route {
                source: Source::Validation,
                index: 2
            }
        );

        // (3 + 0) % 4 == 3 and 3 < 5
        let route = CV.route(3, Source::Training, 5).unwrap();
        assert_eq!(
            route,
            Route {
                source: Source::Validation,
                index: 3
            }
        );
    }

    #[test]
    fn mirrored_pass_falls_back_to_training() {
        let route = CV.route(11, Source::Validation, 4).unwrap();
        assert_eq!(
            route,
            Route {
                source: Source::Training,
                index: 3
            }
        );
    }

    #[test]
    fn routing_to_an_empty_secondary_source_fails() {
        assert_eq!(
            CV.route(3, Source::Training, 0),
            Err(DataError::EmptySource)
        );
    }

    #[test]
    fn huge_seeds_do_not_overflow() {
        let route = Interleave::CrossValidation { seed: u64::MAX }
            .route(4, Source::Training, 10)
            .unwrap();
        // (4 + 2^64 - 1) mod 4 == 3
        assert_eq!(route.source, Source::Validation);
    }

    #[test]
    fn fetch_reads_the_routed_source() {
        let training = InMemorySource::new(vec![0., 0., 1., 1., 2., 2., 3., 3.], 1, 1).unwrap();
        let validation = InMemorySource::new(vec![10., 10., 20., 20.], 1, 1).unwrap();
        let mut sources = Sources::new(training, Some(validation));
        let mut record = Record::new(1, 1);

        let route = sources
            .fetch(3, Source::Training, CV, &mut record)
            .unwrap();

        assert_eq!(
            route,
            Route {
                source: Source::Validation,
                index: 1
            }
        );
        assert_eq!(record.input, [20.]);
    }

    #[test]
    fn fetch_without_validation_source_fails() {
        let training = InMemorySource::new(vec![0., 0.], 1, 1).unwrap();
        let mut sources = Sources::new(training, None);
        let mut record = Record::new(1, 1);

        assert_eq!(sources.len_of(Source::Validation), 0);
        assert_eq!(
            sources.fetch(0, Source::Validation, Interleave::Disabled, &mut record),
            Err(DataError::EmptySource)
        );
    }
}
