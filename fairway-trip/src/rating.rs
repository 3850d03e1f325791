use fairway_core::DriverProfile;

/// Fold one trip rating into the driver's running average.
///
/// `total_trips` is read, never incremented: the completion flow is the
/// single authoritative increment point for that counter.
pub fn apply_rating(profile: &mut DriverProfile, new_rating: f64) {
    let folded = (profile.rating * profile.total_trips as f64 + new_rating)
        / (profile.total_trips as f64 + 1.0);
    profile.rating = folded.clamp(1.0, 5.0);
}
