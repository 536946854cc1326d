//! HTML rendering for the edit form.

use minijinja::{context, Environment};

use super::models::Post;
use super::routes::{url_for, Endpoint};

const EDIT_TEMPLATE_NAME: &str = "edit_post.html";

const EDIT_TEMPLATE: &str = r#"<!doctype html>
<html>
  <head>
    <title>Edit post {{ post.id }}</title>
  </head>
  <body>
    <form class="edit-post" data-method="PUT" action="{{ action|safe }}">
      <label for="title">Title</label>
      <input type="text" id="title" name="title" value="{{ post.title }}">
      <label for="body">Body</label>
      <textarea id="body" name="body">{{ post.body }}</textarea>
      <button type="submit">Save</button>
    </form>
  </body>
</html>
"#;

/// Template collaborator for the edit page.
pub trait EditFormRenderer: Send + Sync {
    fn render_edit(&self, post: &Post) -> anyhow::Result<String>;
}

/// Renders the bundled edit template with minijinja (HTML auto-escaping on).
pub struct TemplateRenderer {
    env: Environment<'static>,
}

impl TemplateRenderer {
    pub fn new() -> anyhow::Result<Self> {
        let mut env = Environment::new();
        env.add_template(EDIT_TEMPLATE_NAME, EDIT_TEMPLATE)?;
        Ok(Self { env })
    }
}

impl EditFormRenderer for TemplateRenderer {
    fn render_edit(&self, post: &Post) -> anyhow::Result<String> {
        let template = self.env.get_template(EDIT_TEMPLATE_NAME)?;
        let markup = template.render(context! {
            post => post,
            action => url_for(Endpoint::EditPost(post.id)),
        })?;
        Ok(markup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_post_fields_escaped() {
        let renderer = TemplateRenderer::new().unwrap();
        let markup = renderer
            .render_edit(&Post {
                id: 7,
                title: "Bells & <whistles>".to_string(),
                body: "Just a test".to_string(),
            })
            .unwrap();

        assert!(markup.contains("Edit post 7"));
        assert!(markup.contains("Bells &amp; &lt;whistles&gt;"));
        assert!(markup.contains(r#"action="/api/post/7/edit""#));
        assert!(markup.contains("Just a test</textarea>"));
    }
}
