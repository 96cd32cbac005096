//! JavaScript sources of the generated packages.
//!
//! Module names and the environment key are inserted as JSON string literals,
//! which are valid JavaScript string literals.
//!
//! Any change to the rendered output must come with a bump of
//! [`CACHE_VERSION`](crate::constants::CACHE_VERSION).

use tera::{Context, Tera};

use crate::core::CondepError;

const BOOL_HELPER: &str = r#"// An unset variable falls back to the configured default; "", "0" and "false" are false.
function bool(value) {
  if (value == null) return {{ default_value }};
  return !!value && value !== "false" && value !== "0";
}
"#;

const COMMONJS_SELECTOR: &str = r#"{{ helper }}
module.exports = bool(process.env[{{ env_key }}])
  ? {{ consequent }}
  : {{ alternate }};
"#;

const ESM_SELECTOR: &str = r#"{{ helper }}
{% for line in imports %}{{ line }}
{% endfor %}
const selected = bool(process.env[{{ env_key }}]) ? {{ consequent }} : {{ alternate }};
{% if named %}
export const { {{ named }} } = selected;
{% endif %}{% if has_default %}
export default selected.default;
{% endif %}"#;

const PROXY_MODULE: &str = r#"module.exports = require({{ module }});
"#;

/// Inputs shared by both selector modules.
#[derive(Debug, Clone)]
pub(crate) struct Selector<'a> {
    /// Condition name, also the environment variable read
    pub test: &'a str,
    /// Static default used when the variable is unset
    pub default_value: bool,
    /// Module required when the condition holds
    pub consequent: Option<&'a str>,
    /// Module required otherwise
    pub alternate: Option<&'a str>,
}

fn render(name: &str, template: &str, context: &Context) -> Result<String, CondepError> {
    Tera::one_off(template, context, false).map_err(|e| CondepError::Other {
        message: format!("Failed to render {name}: {e}"),
    })
}

fn js_string(value: &str) -> Result<String, CondepError> {
    Ok(serde_json::to_string(value)?)
}

impl Selector<'_> {
    fn base_context(&self) -> Result<Context, CondepError> {
        let mut helper_context = Context::new();
        helper_context.insert("default_value", &self.default_value);

        let mut context = Context::new();
        context.insert("helper", &render("boolean helper", BOOL_HELPER, &helper_context)?);
        context.insert("env_key", &js_string(self.test)?);
        Ok(context)
    }

    /// `index.js`: picks a branch with `require` when first loaded.
    pub(crate) fn render_commonjs(&self) -> Result<String, CondepError> {
        let require = |module: Option<&str>| -> Result<String, CondepError> {
            match module {
                Some(module) => Ok(format!("require({})", js_string(module)?)),
                None => Ok("null".to_string()),
            }
        };

        let mut context = self.base_context()?;
        context.insert("consequent", &require(self.consequent)?);
        context.insert("alternate", &require(self.alternate)?);
        render("index.js", COMMONJS_SELECTOR, &context)
    }

    /// `index.mjs`: imports both branches and re-exports `exports` from the
    /// one that is live when the module is evaluated.
    pub(crate) fn render_esm(&self, exports: &[String]) -> Result<String, CondepError> {
        let mut imports = Vec::new();
        let mut binding = |module: Option<&str>, alias: &str| -> Result<String, CondepError> {
            match module {
                Some(module) => {
                    imports.push(format!("import * as {alias} from {};", js_string(module)?));
                    Ok(alias.to_string())
                }
                None => Ok("{ __proto__: null }".to_string()),
            }
        };
        let consequent = binding(self.consequent, "if_true")?;
        let alternate = binding(self.alternate, "if_false")?;

        let named: Vec<&str> =
            exports.iter().map(String::as_str).filter(|name| *name != "default").collect();

        let mut context = self.base_context()?;
        context.insert("imports", &imports);
        context.insert("consequent", &consequent);
        context.insert("alternate", &alternate);
        context.insert("named", &named.join(", "));
        context.insert("has_default", &exports.iter().any(|name| name == "default"));
        render("index.mjs", ESM_SELECTOR, &context)
    }
}

/// `index.js` of a proxy package: re-exports the wrapped dependency.
pub(crate) fn render_proxy_module(module: &str) -> Result<String, CondepError> {
    let mut context = Context::new();
    context.insert("module", &js_string(module)?);
    render("proxy index.js", PROXY_MODULE, &context)
}
