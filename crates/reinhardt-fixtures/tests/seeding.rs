//! Integration tests for the seeding engine.

mod helpers;

use std::collections::HashSet;

use helpers::stores::{blog_store, library_fixtures, tagged_post_fixtures};
use helpers::test_data::TestDataLoader;
use reinhardt_fixtures::prelude::*;
use rstest::rstest;
use serde_json::{Value, json};
use tempfile::TempDir;

fn assert_identity_complete(seeder: &Seeder<&MemoryStore>, model: &str) {
	let ids = seeder.identities().get(model).unwrap();
	let collection = seeder.fixtures().get(model).unwrap();
	assert_eq!(ids.len(), collection.len());
	assert!(ids.iter().all(|id| !id.is_null()));
	let distinct: HashSet<String> = ids.iter().map(Value::to_string).collect();
	assert_eq!(distinct.len(), ids.len());
}

#[rstest]
#[tokio::test]
async fn test_required_to_one_is_resolved_at_insert(
	blog_store: MemoryStore,
	library_fixtures: FixtureSet,
) {
	let mut seeder = Seeder::new(&blog_store, library_fixtures);
	let report = seeder.seed(Some(&["author", "book"])).await.unwrap();

	assert_eq!(report.records_inserted, 4);
	assert_eq!(report.seeded_models, vec!["author", "book"]);
	assert!(report.is_success());
	assert_identity_complete(&seeder, "author");
	assert_identity_complete(&seeder, "book");

	let authors = seeder.identities().get("author").unwrap();
	let books = blog_store.records("book");
	assert_eq!(books[0]["author"], authors[0]);
	assert_eq!(books[1]["author"], authors[1]);
	assert_eq!(report.state("book"), Some(ModelState::Resolved));
}

#[rstest]
#[tokio::test]
async fn test_optional_to_many_is_attached_by_resolver(
	blog_store: MemoryStore,
	tagged_post_fixtures: FixtureSet,
) {
	let mut seeder = Seeder::new(&blog_store, tagged_post_fixtures)
		.with_options(SeedOptions::new().with_auto_resolve(false));
	let report = seeder.seed(Some(&["author", "tag", "post"])).await.unwrap();
	assert_eq!(report.associations_resolved, 0);
	assert_eq!(report.state("post"), Some(ModelState::Inserted));

	// deferred fields are never sent as raw positions
	assert!(!blog_store.records("post")[0].contains_key("tags"));

	let report = seeder.resolve_associations(None).await.unwrap();
	assert_eq!(report.associations_resolved, 1);
	assert_eq!(report.state("post"), Some(ModelState::Resolved));

	let tags = seeder.identities().get("tag").unwrap();
	let post = &blog_store.records("post")[0];
	assert_eq!(post["tags"], json!([tags[0], tags[1]]));
}

#[rstest]
#[tokio::test]
async fn test_resolution_is_additive_on_rerun(
	blog_store: MemoryStore,
	tagged_post_fixtures: FixtureSet,
) {
	let mut seeder = Seeder::new(&blog_store, tagged_post_fixtures);
	seeder.seed(None).await.unwrap();
	seeder.resolve_associations(Some(&["post"])).await.unwrap();

	let post = &blog_store.records("post")[0];
	assert_eq!(post["tags"].as_array().unwrap().len(), 2);
}

#[rstest]
#[tokio::test]
async fn test_wrong_order_is_ordering_error(
	blog_store: MemoryStore,
	library_fixtures: FixtureSet,
) {
	let mut seeder = Seeder::new(&blog_store, library_fixtures)
		.with_options(SeedOptions::new().with_error_policy(ModelErrorPolicy::SkipModel));

	let result = seeder.seed(Some(&["book", "author"])).await;
	match result {
		Err(SeedingError::Ordering { model, alias, target }) => {
			assert_eq!(model, "book");
			assert_eq!(alias, "author");
			assert_eq!(target, "author");
		}
		other => panic!("Expected ordering error, got {:?}", other),
	}
	assert_eq!(blog_store.count("book"), 0);
	assert!(!seeder.identities().contains("book"));
	assert_eq!(seeder.state("book"), Some(ModelState::Failed));
}

#[rstest]
#[tokio::test]
async fn test_reseeding_is_idempotent(blog_store: MemoryStore, library_fixtures: FixtureSet) {
	let mut seeder = Seeder::new(&blog_store, library_fixtures);

	seeder.seed(None).await.unwrap();
	let first_ids = seeder.identities().get("author").unwrap().to_vec();
	let first_links: Vec<Value> = blog_store
		.records("book")
		.iter()
		.map(|book| book["author"].clone())
		.collect();
	assert_eq!(first_links, first_ids);

	seeder.seed(None).await.unwrap();
	let second_ids = seeder.identities().get("author").unwrap().to_vec();
	let second_links: Vec<Value> = blog_store
		.records("book")
		.iter()
		.map(|book| book["author"].clone())
		.collect();

	assert_eq!(second_ids.len(), first_ids.len());
	assert_eq!(second_links, second_ids);
	assert_eq!(blog_store.count("author"), 2);
	assert_eq!(blog_store.count("book"), 2);
}

#[rstest]
#[tokio::test]
async fn test_empty_collection_skips_only_that_model(blog_store: MemoryStore) {
	let fixtures = FixtureSet::new()
		.with_model("tag", vec![])
		.unwrap()
		.with_model("author", vec![json!({"name": "A"})])
		.unwrap();
	let mut seeder = Seeder::new(&blog_store, fixtures)
		.with_options(SeedOptions::new().with_error_policy(ModelErrorPolicy::SkipModel));

	let report = seeder.seed(None).await.unwrap();
	assert!(!report.is_success());
	assert_eq!(report.failed_models.len(), 1);
	assert_eq!(report.failed_models[0].0, "tag");
	assert_eq!(report.seeded_models, vec!["author"]);
	assert_eq!(report.state("tag"), Some(ModelState::Failed));
	assert!(!seeder.identities().contains("tag"));
	assert_eq!(blog_store.count("author"), 1);
}

#[rstest]
#[tokio::test]
async fn test_empty_collection_aborts_by_default(blog_store: MemoryStore) {
	let fixtures = FixtureSet::new()
		.with_model("tag", vec![])
		.unwrap()
		.with_model("author", vec![json!({"name": "A"})])
		.unwrap();
	let mut seeder = Seeder::new(&blog_store, fixtures);

	let result = seeder.seed(None).await;
	assert!(matches!(result, Err(SeedingError::Validation { .. })));
	assert_eq!(blog_store.count("author"), 0);
}

#[rstest]
#[tokio::test]
async fn test_out_of_bounds_position_is_fatal(blog_store: MemoryStore) {
	let fixtures = FixtureSet::new()
		.with_model("author", vec![json!({"name": "A"})])
		.unwrap()
		.with_model("book", vec![json!({"title": "X", "author": 3})])
		.unwrap();
	let mut seeder = Seeder::new(&blog_store, fixtures)
		.with_options(SeedOptions::new().with_error_policy(ModelErrorPolicy::SkipModel));

	let result = seeder.seed(None).await;
	assert!(matches!(
		result,
		Err(SeedingError::OutOfBounds { position: 3, len: 1, .. })
	));
	assert_eq!(blog_store.count("book"), 0);
}

#[rstest]
#[tokio::test]
async fn test_out_of_bounds_deferred_position_is_fatal(blog_store: MemoryStore) {
	let fixtures = FixtureSet::new()
		.with_model("author", vec![json!({"name": "A"})])
		.unwrap()
		.with_model("tag", vec![json!({"name": "t1"})])
		.unwrap()
		.with_model("post", vec![json!({"title": "P", "author": 1, "tags": [1, 2]})])
		.unwrap();
	let mut seeder = Seeder::new(&blog_store, fixtures)
		.with_options(SeedOptions::new().with_error_policy(ModelErrorPolicy::SkipModel));

	let result = seeder.seed(None).await;
	assert!(matches!(result, Err(SeedingError::OutOfBounds { .. })));
	// the post was inserted, but nothing was attached
	assert!(!blog_store.records("post")[0].contains_key("tags"));
	assert_eq!(seeder.state("post"), Some(ModelState::Failed));
}

#[rstest]
#[tokio::test]
async fn test_insert_failure_stops_model(blog_store: MemoryStore, library_fixtures: FixtureSet) {
	blog_store.fail_insert_at("book", 2);
	let mut seeder = Seeder::new(&blog_store, library_fixtures)
		.with_options(SeedOptions::new().with_error_policy(ModelErrorPolicy::SkipModel));

	let report = seeder.seed(None).await.unwrap();
	assert_eq!(report.seeded_models, vec!["author"]);
	assert_eq!(report.failed_models[0].0, "book");
	assert!(report.failed_models[0].1.contains("at position 2"));

	// no rollback: the first book stays, but the identity map is withdrawn
	assert_eq!(blog_store.count("book"), 1);
	assert!(!seeder.identities().contains("book"));
	assert_eq!(report.state("book"), Some(ModelState::Failed));
}

#[rstest]
#[tokio::test]
async fn test_insert_failure_aborts_by_default(
	blog_store: MemoryStore,
	library_fixtures: FixtureSet,
) {
	blog_store.fail_insert_at("author", 1);
	let mut seeder = Seeder::new(&blog_store, library_fixtures);

	let result = seeder.seed(None).await;
	match result {
		Err(SeedingError::Store {
			operation, model, context, ..
		}) => {
			assert_eq!(operation.to_string(), "insert");
			assert_eq!(model, "author");
			assert_eq!(context.position, Some(1));
		}
		other => panic!("Expected store error, got {:?}", other),
	}
	assert_eq!(blog_store.count("book"), 0);
}

#[rstest]
#[tokio::test]
async fn test_truncate_failure_is_fatal(blog_store: MemoryStore, library_fixtures: FixtureSet) {
	blog_store.fail_truncate("author");
	let mut seeder = Seeder::new(&blog_store, library_fixtures)
		.with_options(SeedOptions::new().with_error_policy(ModelErrorPolicy::SkipModel));

	let result = seeder.seed(None).await;
	assert!(matches!(result, Err(ref e) if e.is_fatal()));
	assert_eq!(blog_store.count("book"), 0);
}

#[rstest]
#[tokio::test]
async fn test_resolve_without_seeding(blog_store: MemoryStore, library_fixtures: FixtureSet) {
	let mut seeder = Seeder::new(&blog_store, library_fixtures);
	let result = seeder.resolve_associations(Some(&["book"])).await;
	assert!(matches!(result, Err(SeedingError::NotSeeded(model)) if model == "book"));
}

#[rstest]
#[tokio::test]
async fn test_seed_fixture_directory(blog_store: MemoryStore) {
	let loader = TestDataLoader::new();
	let mut seeder = Seeder::from_source(&blog_store, &loader.source("blog")).unwrap();
	assert_eq!(
		seeder.fixtures().model_names(),
		["author", "book", "post", "tag"]
	);

	let report = seeder.seed(None).await.unwrap();
	assert_eq!(report.records_inserted, 9);
	// reviewer + tags on post 1, tags on post 2, featured_post on tag 1
	assert_eq!(report.associations_resolved, 4);

	let authors = seeder.identities().get("author").unwrap().to_vec();
	let posts = seeder.identities().get("post").unwrap().to_vec();
	let tags = seeder.identities().get("tag").unwrap().to_vec();

	let stored_posts = blog_store.records("post");
	assert_eq!(stored_posts[0]["author"], authors[0]);
	assert_eq!(stored_posts[0]["reviewer"], authors[1]);
	assert_eq!(stored_posts[0]["tags"], json!([tags[0], tags[1]]));
	assert_eq!(stored_posts[1]["tags"], json!([tags[1]]));
	assert!(!stored_posts[2].contains_key("reviewer"));

	let stored_tags = blog_store.records("tag");
	assert_eq!(stored_tags[0]["featured_post"], posts[0]);
	assert!(!stored_tags[1].contains_key("featured_post"));
}

#[rstest]
#[tokio::test]
async fn test_listed_twice_reseeds_model(blog_store: MemoryStore, library_fixtures: FixtureSet) {
	let mut seeder = Seeder::new(&blog_store, library_fixtures);
	let report = seeder
		.seed(Some(&["author", "book", "author"]))
		.await
		.unwrap();

	assert_eq!(report.records_inserted, 6);
	assert_eq!(blog_store.count("author"), 2);
	assert_identity_complete(&seeder, "author");
}

#[rstest]
#[tokio::test]
async fn test_attach_failure_aborts_resolution(
	blog_store: MemoryStore,
	tagged_post_fixtures: FixtureSet,
) {
	blog_store.fail_attach("post");
	let mut seeder = Seeder::new(&blog_store, tagged_post_fixtures);

	let result = seeder.seed(None).await;
	match result {
		Err(SeedingError::Store {
			operation, model, context, ..
		}) => {
			assert_eq!(operation, StoreOperation::Attach);
			assert_eq!(model, "post");
			assert_eq!(context.position, Some(1));
			assert_eq!(context.alias.as_deref(), Some("tags"));
		}
		other => panic!("Expected store error, got {:?}", other),
	}
	assert_eq!(seeder.state("post"), Some(ModelState::Failed));
	// the insert pass already completed
	assert_eq!(blog_store.count("post"), 1);
}

#[rstest]
#[tokio::test]
async fn test_attach_failure_skips_model_and_resolves_rest(blog_store: MemoryStore) {
	blog_store.fail_attach("post");
	let loader = TestDataLoader::new();
	let mut seeder = Seeder::from_source(&blog_store, &loader.source("blog"))
		.unwrap()
		.with_options(SeedOptions::new().with_error_policy(ModelErrorPolicy::SkipModel));

	let report = seeder.seed(None).await.unwrap();
	assert!(!report.is_success());
	assert_eq!(report.failed_models.len(), 1);
	assert_eq!(report.failed_models[0].0, "post");
	assert!(report.failed_models[0].1.contains("at position 1, alias 'tags'"));
	assert_eq!(report.state("post"), Some(ModelState::Failed));

	// tag comes after post and is still linked
	assert_eq!(report.state("tag"), Some(ModelState::Resolved));
	assert_eq!(report.associations_resolved, 1);
	let posts = seeder.identities().get("post").unwrap();
	assert_eq!(blog_store.records("tag")[0]["featured_post"], posts[0]);
}

#[rstest]
#[tokio::test]
async fn test_update_failure_reports_position(blog_store: MemoryStore) {
	blog_store.fail_update("tag");
	let loader = TestDataLoader::new();
	let mut seeder = Seeder::from_source(&blog_store, &loader.source("blog")).unwrap();

	let result = seeder.seed(None).await;
	match result {
		Err(SeedingError::Store {
			operation, model, context, ..
		}) => {
			assert_eq!(operation, StoreOperation::Update);
			assert_eq!(model, "tag");
			assert_eq!(context, ErrorContext::at(1));
		}
		other => panic!("Expected store error, got {:?}", other),
	}
	assert_eq!(seeder.state("post"), Some(ModelState::Resolved));
	assert_eq!(seeder.state("tag"), Some(ModelState::Failed));
	assert!(!blog_store.records("tag")[0].contains_key("featured_post"));
}

#[rstest]
#[tokio::test]
async fn test_listed_twice_resolves_once(
	blog_store: MemoryStore,
	tagged_post_fixtures: FixtureSet,
) {
	let mut seeder = Seeder::new(&blog_store, tagged_post_fixtures);
	let report = seeder
		.seed(Some(&["author", "tag", "post", "post"]))
		.await
		.unwrap();

	assert_eq!(report.records_inserted, 5);
	assert_eq!(report.associations_resolved, 1);
	assert_eq!(blog_store.count("post"), 1);
	let post = &blog_store.records("post")[0];
	assert_eq!(post["tags"].as_array().unwrap().len(), 2);
}

#[rstest]
fn test_non_object_record_is_rejected_on_load(blog_store: MemoryStore) {
	let dir = TempDir::new().unwrap();
	std::fs::write(dir.path().join("tag.json"), r#"[{"name": "t1"}, 42, "oops"]"#).unwrap();

	let result = Seeder::from_source(&blog_store, &DirectorySource::new(dir.path()));
	match result {
		Err(SeedingError::Validation { model, message }) => {
			assert_eq!(model, "tag");
			assert!(message.contains("index 1"));
		}
		Err(other) => panic!("Expected ValidationError, got {:?}", other),
		Ok(_) => panic!("Expected ValidationError"),
	}
	assert_eq!(blog_store.count("tag"), 0);
}
