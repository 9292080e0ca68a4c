//! Bevy integration.
//!
//! `SightPlugin` installs the config as a resource and answers
//! [`SightRequest`] events against the [`SightGrid`] resource once per frame.

use bevy::prelude::*;

use crate::config::SightConfig;
use crate::grid::TileGrid;
use crate::logging::init_tracing_default;
use crate::query::{Sight, SightQuery};

/// Config shared by every sight system
#[derive(Resource, Debug, Clone, Default)]
pub struct SightSettings(pub SightConfig);

/// Map that sight requests are traced against
#[derive(Resource, Debug, Clone, Default)]
pub struct SightGrid(pub TileGrid);

/// Ask whether a query's observer sees its target; `tag` is echoed back
#[derive(Event, Debug, Clone, Copy)]
pub struct SightRequest {
    pub tag: u64,
    pub query: SightQuery,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SightResult {
    pub tag: u64,
    pub visible: bool,
}

#[derive(Default)]
pub struct SightPlugin {
    pub config: SightConfig,
}

impl Plugin for SightPlugin {
    fn build(&self, app: &mut App) {
        init_tracing_default();
        app.insert_resource(SightSettings(self.config.clone().validate()))
            .init_resource::<SightGrid>()
            .add_event::<SightRequest>()
            .add_event::<SightResult>()
            .add_systems(Update, answer_sight_requests);
    }
}

/// Batch every pending request through the query surface
pub fn answer_sight_requests(
    settings: Res<SightSettings>,
    grid: Res<SightGrid>,
    mut requests: EventReader<SightRequest>,
    mut results: EventWriter<SightResult>,
) {
    let pending: Vec<SightRequest> = requests.read().copied().collect();
    if pending.is_empty() {
        return;
    }
    let queries: Vec<SightQuery> = pending.iter().map(|r| r.query).collect();
    let sight = Sight::new(&settings.0, &grid.0);
    let answers = sight.evaluate_batch(&queries);
    for (request, visible) in pending.iter().zip(answers) {
        results.send(SightResult {
            tag: request.tag,
            visible,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::direction::Direction;
    use crate::query::Observer;

    #[test]
    fn test_plugin_answers_requests() {
        let mut grid = TileGrid::new(8, 8);
        grid.set_wall(3, 0);

        let mut app = App::new();
        app.add_plugins(SightPlugin {
            config: SightConfig {
                default_fov: 360.0,
                ..SightConfig::default()
            },
        });
        app.insert_resource(SightGrid(grid));

        let obs = Observer::new(0, 0, Direction::East);
        app.world_mut().send_event(SightRequest {
            tag: 1,
            query: SightQuery::new(obs, (5, 0)),
        });
        app.world_mut().send_event(SightRequest {
            tag: 2,
            query: SightQuery::new(obs, (0, 5)),
        });
        app.update();

        let events = app.world().resource::<Events<SightResult>>();
        let mut cursor = events.get_cursor();
        let results: Vec<SightResult> = cursor.read(events).copied().collect();
        assert_eq!(
            results,
            vec![
                SightResult { tag: 1, visible: false },
                SightResult { tag: 2, visible: true },
            ]
        );
    }
}
