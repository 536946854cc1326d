use quill_db::post;
use quill_db::sea_orm::{ColumnTrait, Condition};

/// Query string accepted by the list endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    pub title_like: Option<String>,
    pub body_like: Option<String>,
}

impl ListParams {
    /// Collect the known keys from decoded query pairs; the first occurrence
    /// of a repeated key wins and unknown keys are ignored.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "title_like" => &mut params.title_like,
                "body_like" => &mut params.body_like,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        params
    }

    fn title(&self) -> Option<&str> {
        self.title_like.as_deref().filter(|s| !s.is_empty())
    }

    fn body(&self) -> Option<&str> {
        self.body_like.as_deref().filter(|s| !s.is_empty())
    }
}

/// Translate list parameters into a condition on the `posts` columns.
///
/// A non-empty `title_like` adds a title containment test. A non-empty
/// `body_like` next to it adds the same title test a second time; on its own
/// it adds nothing.
pub fn build_condition(params: &ListParams) -> Condition {
    let mut condition = Condition::all();

    if let Some(title) = params.title() {
        condition = condition.add(post::Column::Title.contains(title));

        if params.body().is_some() {
            condition = condition.add(post::Column::Title.contains(title));
        }
    }

    condition
}
