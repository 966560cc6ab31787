//! Store and fixture setups.

use reinhardt_fixtures::prelude::*;
use rstest::fixture;
use serde_json::json;

/// Store with the blog schema:
///
/// - `author`: no associations
/// - `book.author`: required to-one `author`
/// - `post.author`: required to-one `author`
/// - `post.reviewer`: optional to-one `author`
/// - `post.tags`: optional to-many `tag`
/// - `tag.featured_post`: optional to-one `post`
#[fixture]
pub fn blog_store() -> MemoryStore {
	let store = MemoryStore::new();
	store.register_model("author", ModelSchema::new());
	store.register_model(
		"book",
		ModelSchema::new()
			.with_association(AssociationDescriptor::to_one("author", "author").required()),
	);
	store.register_model(
		"post",
		ModelSchema::new()
			.with_association(AssociationDescriptor::to_one("author", "author").required())
			.with_association(AssociationDescriptor::to_one("reviewer", "author"))
			.with_association(AssociationDescriptor::to_many("tags", "tag")),
	);
	store.register_model(
		"tag",
		ModelSchema::new().with_association(AssociationDescriptor::to_one("featured_post", "post")),
	);
	store
}

/// Two authors with one book each.
#[fixture]
pub fn library_fixtures() -> FixtureSet {
	FixtureSet::new()
		.with_model("author", vec![json!({"name": "A"}), json!({"name": "B"})])
		.unwrap()
		.with_model(
			"book",
			vec![
				json!({"title": "X", "author": 1}),
				json!({"title": "Y", "author": 2}),
			],
		)
		.unwrap()
}

/// Two tags and one post tagged with both.
#[fixture]
pub fn tagged_post_fixtures() -> FixtureSet {
	FixtureSet::new()
		.with_model("author", vec![json!({"name": "A"})])
		.unwrap()
		.with_model("tag", vec![json!({"name": "t1"}), json!({"name": "t2"})])
		.unwrap()
		.with_model("post", vec![json!({"title": "P", "author": 1, "tags": [1, 2]})])
		.unwrap()
}
