//! Ingest and query scenarios

// Imports
use {
	memvis::{AccessId, AccessKind, AccessRecord, AccessStore, Config, KindFilter, Session},
	pretty_assertions::assert_eq,
};

fn session(lines: &[&str]) -> Session {
	let mut session = Session::new(Config::default()).expect("Config should be valid");
	session.ingest(lines);
	session
}

#[test]
fn open_and_close() {
	let session = self::session(&[
		"clk 5",
		r#"new_access name="A-1" type=load addr=0x100"#,
		"clk 10",
		r#"end_access name="A-1""#,
	]);

	assert_eq!(session.store().len(), 1);
	assert_eq!(
		session.store().get(AccessId(1)),
		Some(&AccessRecord {
			id:          AccessId(1),
			kind:        AccessKind::Load,
			address:     256,
			cycle_start: 5,
			cycle_end:   Some(10),
		})
	);
}

#[test]
fn duplicate_id_keeps_first() {
	let mut session = Session::new(Config::default()).expect("Config should be valid");
	let summary = session.ingest([
		"clk 1",
		r#"new_access name="A-7" type=load addr=0x10"#,
		"clk 2",
		r#"new_access name="A-7" type=store addr=0x20"#,
	]);

	assert_eq!(summary.duplicate_ids, 1);
	let record = session.store().get(AccessId(7)).expect("Access should exist");
	assert_eq!((record.address, record.cycle_start), (0x10, 1));
	assert_eq!(record.kind, AccessKind::Load);
}

#[test]
fn unknown_close() {
	let mut session = Session::new(Config::default()).expect("Config should be valid");
	let summary = session.ingest([r#"end_access name="A-99""#]);

	assert_eq!(summary.unknown_closes, 1);
	assert_eq!(session.store(), &AccessStore::new());
	assert_eq!(session.bounds(), None);
	assert_eq!(session.query_window(0, KindFilter::All), None);
}

#[test]
fn window_past_last_cycle() {
	let session = self::session(&[
		"clk 100",
		r#"new_access name="A-1" type=load addr=0x100"#,
		"clk 15000",
		r#"end_access name="A-1""#,
		"clk 20000",
	]);

	// Note: Clock lines after the last access don't extend the bounds
	assert_eq!(session.bounds().map(|bounds| bounds.max_cycle), Some(15000));
	assert_eq!(session.query_window(20000, KindFilter::All), None);
	assert_eq!(session.query_window(15001, KindFilter::All), None);

	let window = session
		.query_window(15000, KindFilter::All)
		.expect("Window should exist");
	assert_eq!((window.lower_cycle, window.upper_cycle), (5000, 15000));
	assert_eq!(window.addresses, [0x100]);
}

#[test]
fn open_access_never_ends() {
	let session = self::session(&[
		"clk 3",
		r#"new_access name="A-1" type=store addr=0x40"#,
		"clk 5000",
		r#"new_access name="A-2" type=load addr=0x80"#,
		"clk 5010",
		r#"end_access name="A-2""#,
	]);

	let window = session
		.query_window(1000, KindFilter::All)
		.expect("Window should exist");
	assert_eq!(window.lower_cycle, 0);
	assert_eq!(window.addresses, [0x40]);

	// Still in flight long after it started
	let window = session
		.query_window(5010, KindFilter::Store)
		.expect("Window should exist");
	assert_eq!(window.addresses, [0x40]);
}

#[test]
fn window_edges_are_exclusive() {
	let session = self::session(&[
		"clk 10",
		r#"new_access name="A-1" type=load addr=1"#,
		"clk 20",
		r#"end_access name="A-1""#,
		r#"new_access name="A-2" type=load addr=2"#,
		"clk 30",
		r#"end_access name="A-2""#,
	]);

	let store = session.store();
	let addresses = |upper, window_size| {
		store
			.query_window(upper, window_size, KindFilter::All)
			.map(|window| window.addresses)
	};

	// `A-1` ends at the lower bound, `A-2` starts at the upper bound
	assert_eq!(addresses(20, 0), Some(vec![]));
	assert_eq!(addresses(20, 1), Some(vec![1]));
	assert_eq!(addresses(21, 1), Some(vec![2]));
	assert_eq!(addresses(30, 30), Some(vec![1, 2]));
}

#[test]
fn stepping_forward() {
	let session = self::session(&[
		"c clk=0",
		r#"mem.new_access name="A-1" type="load" state="l1:load" addr=0x1000"#,
		"c clk=1500",
		r#"mem.end_access name="A-1""#,
		r#"mem.new_access name="A-2" type="store" state="l1:store" addr=0x2000"#,
		"c clk=2500",
		r#"mem.end_access name="A-2""#,
		"c clk=3000",
	]);

	let windows = std::iter::successors(Some(500), |&upper| Some(session.step(upper)))
		.map_while(|upper| session.query_window(upper, KindFilter::All))
		.map(|window| (window.upper_cycle, window.addresses))
		.collect::<Vec<_>>();
	assert_eq!(windows, [
		(500, vec![0x1000]),
		(1500, vec![0x1000]),
		(2500, vec![0x1000, 0x2000])
	]);
}
