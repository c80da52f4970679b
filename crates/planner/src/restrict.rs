use floe_common::model::{KeyRestriction, TokenRange};
use floe_common::ring::{Interval, Partitioner};
use tracing::warn;

use crate::config::{PlannerSettings, PlanningContext};
use crate::error::PlannerError;

/// Unit of work dispatched to one planning worker: a (possibly narrowed)
/// ring range and the requested split granularity.
#[derive(Clone, Debug)]
pub struct PlanningTask {
    pub range: TokenRange,
    pub split_size_rows: u64,
}

/// Narrows ring ranges to the configured key restriction, if any.
#[derive(Debug)]
pub struct RangeRestrictor {
    restriction: Option<Interval>,
}

impl RangeRestrictor {
    pub fn from_settings(
        settings: &PlannerSettings,
        partitioner: &Partitioner,
    ) -> Result<Self, PlannerError> {
        let Some(configured) = &settings.restriction else {
            return Ok(RangeRestrictor { restriction: None });
        };
        let Some(start_key) = &configured.start_key else {
            warn!("ignoring key restriction configured without start_key");
            return Ok(RangeRestrictor { restriction: None });
        };
        if !partitioner.preserves_order() {
            return Err(PlannerError::Configuration(
                "a key restriction can only be used with an order-preserving partitioner"
                    .to_string(),
            ));
        }
        if configured.start_token.is_some() || configured.end_token.is_some() {
            return Err(PlannerError::Configuration(
                "only start_key/end_key are supported; raw token bounds are not".to_string(),
            ));
        }
        let restriction = KeyRestriction {
            start_key: start_key.clone().into_bytes(),
            end_key: configured.end_key.clone().map(String::into_bytes),
        };
        let start = partitioner.token_for_key(&restriction.start_key)?;
        let end = match &restriction.end_key {
            Some(key) => partitioner.token_for_key(key)?,
            // No end key: the restriction runs to the ring end.
            None => partitioner.min_token(),
        };
        Ok(RangeRestrictor {
            restriction: Some(Interval::new(start, end)),
        })
    }

    /// One task per ring range, or per non-empty intersection piece when a
    /// restriction is set. Ranges outside the restriction are dropped; the
    /// endpoint lists of narrowed ranges are inherited unchanged.
    pub fn tasks(
        &self,
        ranges: Vec<TokenRange>,
        ctx: &PlanningContext,
    ) -> Result<Vec<PlanningTask>, PlannerError> {
        let mut tasks = Vec::new();
        for range in ranges {
            match &self.restriction {
                None => tasks.push(PlanningTask {
                    range,
                    split_size_rows: ctx.split_size_rows,
                }),
                Some(restriction) => {
                    let p = &ctx.partitioner;
                    let ring = Interval::new(
                        p.parse_token(&range.start_token)?,
                        p.parse_token(&range.end_token)?,
                    );
                    for piece in ring.intersection(restriction, p) {
                        let mut narrowed = range.clone();
                        narrowed.start_token = p.token_to_string(&piece.start);
                        narrowed.end_token = p.token_to_string(&piece.end);
                        tasks.push(PlanningTask {
                            range: narrowed,
                            split_size_rows: ctx.split_size_rows,
                        });
                    }
                }
            }
        }
        Ok(tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::config::RestrictionSettings;

    fn byte_ordered_settings(restriction: Option<RestrictionSettings>) -> PlannerSettings {
        PlannerSettings {
            seeds: vec!["127.0.0.1".to_string()],
            rpc_port: 9160,
            keyspace: "ks".to_string(),
            table: "events".to_string(),
            partitioner: "byte_ordered".to_string(),
            split_size_rows: 1000,
            max_parallel: 0,
            max_retries: 3,
            unit_timeout_secs: None,
            restriction,
            credentials: None,
        }
    }

    fn key_restriction(start_key: Option<&str>, end_key: Option<&str>) -> RestrictionSettings {
        RestrictionSettings {
            start_key: start_key.map(str::to_string),
            end_key: end_key.map(str::to_string),
            start_token: None,
            end_token: None,
        }
    }

    fn ring_range(start: &str, end: &str) -> TokenRange {
        TokenRange {
            start_token: start.to_string(),
            end_token: end.to_string(),
            endpoints: vec!["host-a".to_string()],
            rpc_endpoints: vec!["".to_string()],
        }
    }

    #[test]
    fn without_restriction_every_range_is_one_task() {
        let settings = byte_ordered_settings(None);
        let ctx = settings.context().unwrap();
        let restrictor = RangeRestrictor::from_settings(&settings, &ctx.partitioner).unwrap();
        let tasks = restrictor
            .tasks(vec![ring_range("10", "90"), ring_range("90", "10")], &ctx)
            .unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].range, ring_range("10", "90"));
        assert_eq!(tasks[0].split_size_rows, 1000);
    }

    #[test]
    fn restriction_without_start_key_is_ignored() {
        let settings = byte_ordered_settings(Some(key_restriction(None, Some("z"))));
        let ctx = settings.context().unwrap();
        let restrictor = RangeRestrictor::from_settings(&settings, &ctx.partitioner).unwrap();
        let tasks = restrictor.tasks(vec![ring_range("10", "90")], &ctx).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].range, ring_range("10", "90"));
    }

    #[test]
    fn restriction_requires_an_order_preserving_partitioner() {
        let mut settings = byte_ordered_settings(Some(key_restriction(Some("@"), None)));
        settings.partitioner = "murmur3".to_string();
        let err = RangeRestrictor::from_settings(&settings, &floe_common::ring::Partitioner::Murmur3)
            .unwrap_err();
        assert!(matches!(err, PlannerError::Configuration(_)));
    }

    #[test]
    fn raw_token_bounds_are_rejected() {
        let mut restriction = key_restriction(Some("@"), None);
        restriction.start_token = Some("40".to_string());
        let settings = byte_ordered_settings(Some(restriction));
        let ctx = settings.context().unwrap();
        let err = RangeRestrictor::from_settings(&settings, &ctx.partitioner).unwrap_err();
        assert!(matches!(err, PlannerError::Configuration(_)));
    }

    #[test]
    fn open_ended_restriction_narrows_the_ring_range() {
        // Start key "@" sits at token 40; no end key, so the restriction
        // runs to the ring end. Ring range [10, 90) narrows to [40, 90).
        let settings = byte_ordered_settings(Some(key_restriction(Some("@"), None)));
        let ctx = settings.context().unwrap();
        let restrictor = RangeRestrictor::from_settings(&settings, &ctx.partitioner).unwrap();
        let tasks = restrictor.tasks(vec![ring_range("10", "90")], &ctx).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].range.start_token, "40");
        assert_eq!(tasks[0].range.end_token, "90");
        assert_eq!(tasks[0].range.endpoints, vec!["host-a".to_string()]);
    }

    #[test]
    fn bounded_restriction_keeps_only_the_overlap() {
        // Keys "@" (0x40) and "P" (0x50).
        let settings = byte_ordered_settings(Some(key_restriction(Some("@"), Some("P"))));
        let ctx = settings.context().unwrap();
        let restrictor = RangeRestrictor::from_settings(&settings, &ctx.partitioner).unwrap();
        let tasks = restrictor
            .tasks(vec![ring_range("10", "48"), ring_range("60", "90")], &ctx)
            .unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].range.start_token, "40");
        assert_eq!(tasks[0].range.end_token, "48");
    }

    #[test]
    fn disjoint_ranges_are_dropped() {
        let settings = byte_ordered_settings(Some(key_restriction(Some("@"), Some("P"))));
        let ctx = settings.context().unwrap();
        let restrictor = RangeRestrictor::from_settings(&settings, &ctx.partitioner).unwrap();
        let tasks = restrictor.tasks(vec![ring_range("60", "90")], &ctx).unwrap();
        assert!(tasks.is_empty());
    }
}
