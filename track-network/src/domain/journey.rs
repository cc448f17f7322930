//! Journey types.
//!
//! A `Journey` is an ordered run of routes that a train can follow without
//! stopping to reverse: each route starts at the signal where the previous
//! one ended, and all routes share one direction. Journeys are only made by
//! [`JourneyBuilder::build`], which checks both rules first.

use std::fmt;

use tracing::debug;

use super::{Direction, JourneyError, JourneyFault, Route, SignalId};

/// Identifier of a built journey, formatted as `J<n>`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct JourneyId(u64);

impl JourneyId {
    /// Returns the sequence number behind this id.
    pub fn sequence(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for JourneyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JourneyId(J{})", self.0)
    }
}

impl fmt::Display for JourneyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "J{}", self.0)
    }
}

/// Source of journey ids.
///
/// Owned by the caller and passed to [`JourneyBuilder::build`]. Each call to
/// [`next_id`](Self::next_id) hands out the current number and then advances,
/// so ids from one generator are strictly increasing. After `J18446744073709551615`
/// the generator is spent and refuses to hand out more.
///
/// # Examples
///
/// ```
/// use track_network::domain::JourneyIdGenerator;
///
/// let mut ids = JourneyIdGenerator::new();
/// assert_eq!(ids.next_id().unwrap().to_string(), "J0");
/// assert_eq!(ids.next_id().unwrap().to_string(), "J1");
/// ```
#[derive(Debug, Clone)]
pub struct JourneyIdGenerator {
    /// `None` once `u64::MAX` has been handed out.
    next: Option<u64>,
}

impl Default for JourneyIdGenerator {
    fn default() -> Self {
        Self { next: Some(0) }
    }
}

impl JourneyIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume numbering at `next`, e.g. after reloading saved journeys.
    pub fn starting_at(next: u64) -> Self {
        Self { next: Some(next) }
    }

    /// Hands out the next id.
    ///
    /// # Errors
    ///
    /// Returns [`JourneyError::IdsExhausted`] once the last id is gone.
    pub fn next_id(&mut self) -> Result<JourneyId, JourneyError> {
        let current = self.next.ok_or(JourneyError::IdsExhausted)?;
        self.next = current.checked_add(1);
        Ok(JourneyId(current))
    }

    /// The number the next id will carry, or `None` if the generator is spent.
    pub fn peek(&self) -> Option<u64> {
        self.next
    }
}

/// Checks that consecutive routes meet and share a direction.
///
/// Returns the index of the second route of the first bad pair.
fn validate_path(path: &[Route]) -> Result<(), JourneyError> {
    for (i, pair) in path.windows(2).enumerate() {
        let (a, b) = (&pair[0], &pair[1]);

        if a.destination() != b.source() {
            return Err(JourneyError::Invalid {
                index: i + 1,
                fault: JourneyFault::NotAdjacent {
                    expected: a.destination().clone(),
                    found: b.source().clone(),
                },
            });
        }

        if a.direction() != b.direction() {
            return Err(JourneyError::Invalid {
                index: i + 1,
                fault: JourneyFault::DirectionMismatch {
                    expected: a.direction(),
                    found: b.direction(),
                },
            });
        }
    }

    Ok(())
}

/// Accumulates routes for a journey.
///
/// Appending never validates; everything is checked in one go by
/// [`build`](Self::build). Building does not consume the builder, so a
/// rejected path can be corrected and built again.
#[derive(Debug, Clone, Default)]
pub struct JourneyBuilder {
    path: Vec<Route>,
}

impl JourneyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a route. Returns the new path length.
    pub fn add_route(&mut self, route: Route) -> usize {
        self.path.push(route);
        self.path.len()
    }

    /// Appends several routes in order. Returns the new path length.
    pub fn add_routes<I>(&mut self, routes: I) -> usize
    where
        I: IntoIterator<Item = Route>,
    {
        self.path.extend(routes);
        self.path.len()
    }

    /// Removes and returns the last route.
    ///
    /// # Errors
    ///
    /// Returns [`JourneyError::EmptyPath`] if there is nothing to remove.
    pub fn remove_trailing_route(&mut self) -> Result<Route, JourneyError> {
        self.path.pop().ok_or(JourneyError::EmptyPath)
    }

    pub fn current_path(&self) -> &[Route] {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// Checks the current path without building.
    pub fn validate(&self) -> Result<(), JourneyError> {
        validate_path(&self.path)
    }

    /// Validates the path and seals it into a [`Journey`].
    ///
    /// Paths of zero or one route are always valid. An id is only drawn
    /// from `ids` when the path is accepted.
    ///
    /// # Errors
    ///
    /// Returns [`JourneyError::Invalid`] if two consecutive routes do not
    /// meet at the same signal or run in different directions.
    /// Returns [`JourneyError::IdsExhausted`] if `ids` has no ids left.
    ///
    /// # Examples
    ///
    /// ```
    /// use track_network::domain::{Direction, JourneyBuilder, JourneyIdGenerator, Route, SignalId};
    ///
    /// let sig = |s: &str| SignalId::new(s).unwrap();
    /// let mut ids = JourneyIdGenerator::new();
    /// let mut builder = JourneyBuilder::new();
    /// builder.add_route(Route::new(sig("A"), sig("B"), Direction::Up));
    /// builder.add_route(Route::new(sig("B"), sig("C"), Direction::Up));
    ///
    /// let journey = builder.build(&mut ids).unwrap();
    /// assert_eq!(journey.start_signal(), Some(&sig("A")));
    /// assert_eq!(journey.destination_signal(), Some(&sig("C")));
    /// ```
    pub fn build(&self, ids: &mut JourneyIdGenerator) -> Result<Journey, JourneyError> {
        if let Err(err) = validate_path(&self.path) {
            debug!(routes = self.path.len(), error = %err, "Rejected journey");
            return Err(err);
        }

        let id = ids.next_id()?;
        debug!(id = %id, routes = self.path.len(), "Built journey");

        Ok(Journey {
            id,
            routes: self.path.clone(),
        })
    }
}

/// A validated, immutable sequence of routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Journey {
    id: JourneyId,
    routes: Vec<Route>,
}

impl Journey {
    pub fn id(&self) -> &JourneyId {
        &self.id
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// The direction shared by every route, if there are any.
    pub fn direction(&self) -> Option<Direction> {
        self.routes.first().map(Route::direction)
    }

    /// Signal at the start of the first route.
    pub fn start_signal(&self) -> Option<&SignalId> {
        self.routes.first().map(Route::source)
    }

    /// Signal at the end of the last route.
    pub fn destination_signal(&self) -> Option<&SignalId> {
        self.routes.last().map(Route::destination)
    }

    /// Every signal passed, from start to destination.
    pub fn signals(&self) -> impl Iterator<Item = &SignalId> {
        self.routes
            .first()
            .map(Route::source)
            .into_iter()
            .chain(self.routes.iter().map(Route::destination))
    }
}
