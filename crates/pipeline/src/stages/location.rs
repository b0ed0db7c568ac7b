//! Location stage: resolve the birth place to coordinates + timezone.
//!
//! When the caller already supplied coordinates they win; geocoding is
//! only for the place string. Either way the timezone is the system's
//! birth-time convention.

use ad_domain::birth::BIRTH_TIMEZONE;
use ad_domain::conversation::{ConversationState, ResolvedLocation};
use ad_domain::error::Result;

use crate::Capabilities;

pub async fn run(state: &mut ConversationState, caps: &Capabilities) -> Result<()> {
    let facts = &state.birth_facts;

    let location = if let (Some(latitude), Some(longitude)) = (facts.latitude, facts.longitude) {
        ResolvedLocation {
            place_name: facts.place_of_birth.clone(),
            latitude,
            longitude,
            timezone: BIRTH_TIMEZONE.into(),
        }
    } else {
        caps.geocoder.resolve(&facts.place_of_birth).await?
    };

    state.set_location(location);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{caps_with, facts, CountingGeocoder};
    use ad_domain::conversation::RequestKind;
    use std::sync::Arc;

    #[tokio::test]
    async fn explicit_coordinates_skip_geocoding() {
        let geocoder = Arc::new(CountingGeocoder::default());
        let caps = caps_with(geocoder.clone());
        let mut f = facts();
        f.latitude = Some(19.076);
        f.longitude = Some(72.8777);
        let mut state = ConversationState::new(f, RequestKind::FullReport);

        run(&mut state, &caps).await.unwrap();

        assert_eq!(geocoder.calls(), 0);
        let loc = state.location.unwrap();
        assert!((loc.latitude - 19.076).abs() < 1e-9);
        assert_eq!(loc.timezone, "Asia/Kolkata");
    }

    #[tokio::test]
    async fn place_string_is_geocoded() {
        let geocoder = Arc::new(CountingGeocoder::default());
        let caps = caps_with(geocoder.clone());
        let mut state = ConversationState::new(facts(), RequestKind::FullReport);

        run(&mut state, &caps).await.unwrap();

        assert_eq!(geocoder.calls(), 1);
        assert!(state.location.is_some());
    }
}
