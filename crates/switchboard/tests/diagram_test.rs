//! Integration tests for the diagram bridge: linking, cascades and layout.

use switchboard::{
    editors,
    geometry::{Point, Size},
    identifier::Id,
    layout::{GridPacker, Packer, Placement},
    model::{Cardinality, Endpoint, EndpointRole, RejectReason, State},
    plumbing::{Diagram, DiagramEvent, LinkOutcome, LinkState, RecordingPlumbing},
};

fn id(name: &str) -> Id {
    Id::new(name)
}

/// A dialogue diagram with a `send` step `s1` and two `end` steps.
fn dialogue() -> Diagram<RecordingPlumbing> {
    let mut diagram = Diagram::new(
        editors::dialogue(),
        RecordingPlumbing::new(),
        Placement::default(),
    )
    .expect("Failed to build diagram");

    for (kind, state) in [("send", "s1"), ("end", "s2"), ("end", "s3")] {
        let state = diagram
            .instantiate(id(kind), id(state))
            .expect("Failed to instantiate");
        diagram.add_state(None, state).expect("Failed to add state");
    }
    diagram
}

#[test]
fn test_new_state_registers_handles() {
    let diagram = dialogue();
    let plumbing = diagram.plumbing();

    assert!(plumbing.is_source(id("start")));
    assert!(plumbing.is_source(id("s1-exit")));
    assert!(!plumbing.is_target(id("s1-exit")));
    assert!(plumbing.is_target(id("s2-entry")));
    assert_eq!(
        plumbing.source_options(id("s1-exit")).unwrap().max_connections,
        Some(1)
    );
    assert_eq!(diagram.state_view(id("s1")).unwrap().endpoints().len(), 2);
}

#[test]
fn test_user_link_creates_connection() {
    let mut diagram = dialogue();
    let events = diagram.watch();

    diagram.on_drag_started(id("s1-exit"));
    assert_eq!(
        diagram.link_state(id("s1-exit"), id("s2-entry")),
        LinkState::Pending
    );

    let link = diagram.plumbing_mut().draw(id("s1-exit"), id("s2-entry"));
    let outcome = diagram
        .on_link_created(id("s1-exit"), id("s2-entry"), link)
        .unwrap();

    let connection = Id::connection(id("s1-exit"), id("s2-entry"));
    assert_eq!(
        outcome,
        LinkOutcome::Connected {
            connection,
            collection: id("choice_connections"),
            created: true,
        }
    );
    assert_eq!(
        diagram.link_state(id("s1-exit"), id("s2-entry")),
        LinkState::Connected { connection }
    );
    assert_eq!(
        diagram.connection_view(connection).unwrap().link(),
        Some(link)
    );
    assert_eq!(
        events.drain(),
        vec![DiagramEvent::Connected {
            connection,
            collection: id("choice_connections"),
        }]
    );
}

#[test]
fn test_connect_is_idempotent() {
    let mut diagram = dialogue();

    let first = diagram.connect(id("s1-exit"), id("s2-entry")).unwrap();
    let second = diagram.connect(id("s1-exit"), id("s2-entry")).unwrap();

    assert!(matches!(first, LinkOutcome::Connected { created: true, .. }));
    assert!(matches!(second, LinkOutcome::Connected { created: false, .. }));
    assert_eq!(diagram.model().connections().len(), 1);
    assert_eq!(
        diagram
            .plumbing()
            .links_between(id("s1-exit"), id("s2-entry")),
        1
    );
}

#[test]
fn test_duplicate_user_line_is_erased() {
    let mut diagram = dialogue();
    diagram.connect(id("s1-exit"), id("s2-entry")).unwrap();

    let duplicate = diagram.plumbing_mut().draw(id("s1-exit"), id("s2-entry"));
    let outcome = diagram
        .on_link_created(id("s1-exit"), id("s2-entry"), duplicate)
        .unwrap();

    assert!(matches!(outcome, LinkOutcome::Connected { created: false, .. }));
    assert!(!diagram.plumbing().has_link(&duplicate));
    assert_eq!(diagram.plumbing().link_count(), 1);
}

#[test]
fn test_rejected_link_is_rolled_back() {
    let mut diagram = dialogue();
    let events = diagram.watch();

    // Entry endpoints only take links.
    let link = diagram.plumbing_mut().draw(id("s2-entry"), id("s3-entry"));
    let outcome = diagram
        .on_link_created(id("s2-entry"), id("s3-entry"), link)
        .unwrap();

    assert_eq!(
        outcome,
        LinkOutcome::Rejected(RejectReason::NoAcceptingCollection)
    );
    assert_eq!(diagram.plumbing().link_count(), 0);
    assert!(diagram.model().connections().is_empty());

    let events = events.drain();
    assert_eq!(events.len(), 1);
    assert!(matches!(
        events[0],
        DiagramEvent::Unsupported { source, target, .. }
            if source == id("s2-entry") && target == id("s3-entry")
    ));
}

#[test]
fn test_link_within_one_state_is_rolled_back() {
    let mut diagram = dialogue();
    let events = diagram.watch();

    let link = diagram.plumbing_mut().draw(id("s1-exit"), id("s1-entry"));
    let outcome = diagram
        .on_link_created(id("s1-exit"), id("s1-entry"), link)
        .unwrap();

    assert_eq!(
        outcome,
        LinkOutcome::Rejected(RejectReason::NoAcceptingCollection)
    );
    assert_eq!(
        diagram
            .plumbing()
            .links_between(id("s1-exit"), id("s1-entry")),
        0
    );
    assert!(diagram.model().connections().is_empty());

    let events = events.drain();
    assert_eq!(events.len(), 1);
    assert!(matches!(
        events[0],
        DiagramEvent::Unsupported { source, target, reason, .. }
            if source == id("s1-exit")
                && target == id("s1-entry")
                && reason == RejectReason::NoAcceptingCollection
    ));
}

#[test]
fn test_pairs_sharing_a_joined_id_stay_apart() {
    let mut diagram = dialogue();
    for (state, endpoint, role) in [
        ("a", "x-y", EndpointRole::Source),
        ("b", "z", EndpointRole::Target),
        ("c", "x", EndpointRole::Source),
        ("d", "y-z", EndpointRole::Target),
    ] {
        let category = if role.is_source() {
            "exit_endpoint"
        } else {
            "entry_endpoint"
        };
        let state = State::new(id(state), id("send"))
            .with_endpoint(Endpoint::new(id(endpoint), id(category)).with_role(role))
            .unwrap();
        diagram.add_state(None, state).unwrap();
    }
    diagram.connect(id("x-y"), id("z")).unwrap();

    let link = diagram.plumbing_mut().draw(id("x"), id("y-z"));
    let outcome = diagram.on_link_created(id("x"), id("y-z"), link).unwrap();

    assert_eq!(
        outcome,
        LinkOutcome::Rejected(RejectReason::IdentityTaken {
            connection: id("x-y-z")
        })
    );
    assert!(!diagram.plumbing().has_link(&link));

    // Erasing the refused line must not take the other pair's connection.
    assert_eq!(diagram.on_link_detached(&link).unwrap(), None);
    let kept = diagram.model().connection(id("x-y-z")).unwrap();
    assert_eq!((kept.source(), kept.target()), (id("x-y"), id("z")));
    assert_eq!(diagram.plumbing().links_between(id("x-y"), id("z")), 1);
}

#[test]
fn test_single_endpoint_saturates() {
    let mut diagram = dialogue();
    diagram.connect(id("s1-exit"), id("s2-entry")).unwrap();

    let outcome = diagram.connect(id("s1-exit"), id("s3-entry")).unwrap();

    assert_eq!(
        outcome,
        LinkOutcome::Rejected(RejectReason::EndpointSaturated {
            endpoint: id("s1-exit")
        })
    );
    assert_eq!(diagram.plumbing().link_count(), 1);
}

#[test]
fn test_detach_round_trip() {
    let mut diagram = dialogue();
    let link = diagram.plumbing_mut().draw(id("s1-exit"), id("s2-entry"));
    diagram
        .on_link_created(id("s1-exit"), id("s2-entry"), link)
        .unwrap();
    let events = diagram.watch();

    diagram.plumbing_mut().erase(&link);
    let removed = diagram.on_link_detached(&link).unwrap();

    let connection = Id::connection(id("s1-exit"), id("s2-entry"));
    assert_eq!(removed, Some(connection));
    assert!(diagram.model().connections().is_empty());
    assert!(diagram.connection_view(connection).is_none());
    assert!(matches!(
        events.drain().as_slice(),
        [DiagramEvent::Disconnected { .. }]
    ));

    // A second report of the same line is stale.
    assert_eq!(diagram.on_link_detached(&link).unwrap(), None);

    // The pair can be connected again.
    let again = diagram.connect(id("s1-exit"), id("s2-entry")).unwrap();
    assert!(matches!(again, LinkOutcome::Connected { created: true, .. }));
}

#[test]
fn test_programmatic_detach_erases_line() {
    let mut diagram = dialogue();
    diagram.connect(id("s1-exit"), id("s2-entry")).unwrap();
    let connection = Id::connection(id("s1-exit"), id("s2-entry"));

    let removed = diagram.detach(connection).unwrap();

    assert_eq!(removed.map(|c| c.id()), Some(connection));
    assert_eq!(diagram.plumbing().link_count(), 0);
    assert_eq!(diagram.detach(connection).unwrap(), None);
}

#[test]
fn test_remove_state_cascades_in_order() {
    let mut diagram = dialogue();
    diagram.connect(id("s1-exit"), id("s2-entry")).unwrap();
    diagram.set_entry_target(id("s1-entry")).unwrap();
    assert_eq!(diagram.plumbing().link_count(), 2);
    let events = diagram.watch();

    diagram.remove_state(id("s1")).unwrap();

    let events = events.drain();
    let kinds: Vec<&str> = events
        .iter()
        .map(|event| match event {
            DiagramEvent::Disconnected { .. } => "disconnected",
            DiagramEvent::EntryDisconnected { .. } => "entry_disconnected",
            DiagramEvent::EndpointRemoved { .. } => "endpoint_removed",
            DiagramEvent::StateRemoved { .. } => "state_removed",
            _ => "other",
        })
        .collect();
    assert_eq!(
        kinds,
        [
            "disconnected",
            "entry_disconnected",
            "endpoint_removed",
            "endpoint_removed",
            "state_removed"
        ]
    );

    assert_eq!(diagram.plumbing().link_count(), 0);
    assert!(diagram.entry_link().is_none());
    assert!(!diagram.plumbing().is_source(id("s1-exit")));
    assert!(diagram.state_view(id("s1")).is_none());
    assert!(diagram.model().connections().is_empty());
}

#[test]
fn test_remove_endpoint_cascades() {
    let mut diagram = dialogue();
    diagram.connect(id("s1-exit"), id("s2-entry")).unwrap();

    diagram.remove_endpoint(id("s2-entry")).unwrap();

    assert!(diagram.model().connections().is_empty());
    assert_eq!(diagram.plumbing().link_count(), 0);
    assert!(
        diagram
            .state_view(id("s2"))
            .unwrap()
            .endpoint(id("s2-entry"))
            .is_none()
    );
}

#[test]
fn test_entry_target_is_replaced() {
    let mut diagram = dialogue();
    let events = diagram.watch();

    diagram.connect_entry(id("s1-entry")).unwrap();
    let previous = diagram.set_entry_target(id("s2-entry")).unwrap();

    assert_eq!(previous, Some(id("s1-entry")));
    assert_eq!(diagram.plumbing().link_count(), 1);
    assert_eq!(diagram.entry_link().map(|link| link.target), Some(id("s2-entry")));
    assert_eq!(
        events.drain(),
        vec![
            DiagramEvent::EntryConnected {
                target: id("s1-entry")
            },
            DiagramEvent::EntryDisconnected {
                target: id("s1-entry")
            },
            DiagramEvent::EntryConnected {
                target: id("s2-entry")
            },
        ]
    );

    // Reconnecting the same target changes nothing.
    let outcome = diagram.connect_entry(id("s2-entry")).unwrap();
    assert!(matches!(outcome, LinkOutcome::Connected { created: false, .. }));
    assert_eq!(diagram.plumbing().link_count(), 1);

    assert_eq!(diagram.detach_entry().unwrap(), Some(id("s2-entry")));
    assert_eq!(diagram.plumbing().link_count(), 0);
    assert!(diagram.model().entry_point().unwrap().target().is_none());
}

#[test]
fn test_entry_rejects_exit_endpoint() {
    let mut diagram = dialogue();

    let link = diagram.plumbing_mut().draw(id("start"), id("s1-exit"));
    let outcome = diagram.on_link_created(id("start"), id("s1-exit"), link).unwrap();

    assert!(matches!(outcome, LinkOutcome::Rejected(_)));
    assert_eq!(diagram.plumbing().link_count(), 0);
    assert!(diagram.set_entry_target(id("s1-exit")).is_err());
}

#[test]
fn test_states_are_packed_on_add() {
    let diagram = dialogue();

    let positions: Vec<Option<Point>> = ["s1", "s2", "s3"]
        .iter()
        .map(|state| diagram.state_view(id(state)).unwrap().position())
        .collect();

    assert_eq!(
        positions,
        vec![
            Some(Point::new(0.0, 0.0)),
            Some(Point::new(160.0, 0.0)),
            Some(Point::new(320.0, 0.0)),
        ]
    );
    let saved = diagram.model().state(id("s2")).unwrap().layout();
    assert_eq!(saved, Some(Point::new(160.0, 0.0)));
    assert_eq!(diagram.preview_position(id("send")), Point::new(0.0, 80.0));
}

#[test]
fn test_added_endpoints_follow_rearrange() {
    let mut diagram = dialogue();
    let state = diagram
        .instantiate(id("choice"), id("c"))
        .expect("Failed to instantiate");
    diagram.add_state(None, state).unwrap();

    let extra = Endpoint::new(id("c-choice-1"), id("choice_endpoints"))
        .with_role(EndpointRole::Source)
        .with_cardinality(Cardinality::Single)
        .with_label("Later")
        .with_ordinal(1);
    diagram.add_endpoint(id("c"), extra).unwrap();

    assert!(diagram.plumbing().is_source(id("c-choice-1")));
    let view = diagram.state_view(id("c")).unwrap();
    assert_eq!(
        view.endpoint(id("c-choice-1")).and_then(|e| e.label()),
        Some("Later")
    );

    diagram
        .rearrange_endpoints(
            id("c"),
            id("choice_endpoints"),
            &[id("c-choice-1"), id("c-choice-0")],
        )
        .unwrap();

    let state = diagram.model().state(id("c")).unwrap();
    assert_eq!(state.endpoint(id("c-choice-1")).unwrap().ordinal(), 0);
    assert_eq!(state.endpoint(id("c-choice-0")).unwrap().ordinal(), 1);
}

#[test]
fn test_move_and_scroll() {
    let mut diagram = dialogue();
    let events = diagram.watch();

    diagram.move_state(id("s1"), Point::new(50.0, 70.0)).unwrap();
    diagram.set_scroll(Point::new(10.0, 20.0)).unwrap();

    assert_eq!(
        events.drain(),
        vec![DiagramEvent::StateMoved {
            state: id("s1"),
            layout: Point::new(50.0, 70.0),
        }]
    );
    let view = diagram.state_view(id("s1")).unwrap();
    assert_eq!(view.position(), Some(Point::new(40.0, 50.0)));
}

#[test]
fn test_grid_packer_reference_vector() {
    let sizes = [
        (10.0, 20.0),
        (30.0, 40.0),
        (50.0, 60.0),
        (70.0, 80.0),
        (90.0, 100.0),
        (110.0, 120.0),
        (130.0, 140.0),
    ];
    let mut packer = GridPacker::new(3);

    let positions: Vec<(f32, f32)> = sizes
        .iter()
        .map(|(width, height)| {
            let point = packer.add(Size::new(*width, *height));
            (point.x(), point.y())
        })
        .collect();

    assert_eq!(
        positions,
        vec![
            (0.0, 0.0),
            (10.0, 0.0),
            (40.0, 0.0),
            (0.0, 40.0),
            (70.0, 40.0),
            (160.0, 40.0),
            (0.0, 140.0),
        ]
    );
}

#[test]
fn test_render_redraws_missing_lines() {
    let mut diagram = dialogue();
    diagram.connect(id("s1-exit"), id("s2-entry")).unwrap();
    let line = diagram
        .connection_view(Id::connection(id("s1-exit"), id("s2-entry")))
        .and_then(|view| view.link())
        .unwrap();

    diagram.render().unwrap();

    assert_eq!(diagram.plumbing().link_count(), 1);
    assert!(diagram.plumbing().has_link(&line));
    assert!(diagram.state_view(id("s1")).unwrap().render_count() >= 1);
}
