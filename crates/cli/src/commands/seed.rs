//! Seed the backend with users and products from a YAML file.
//!
//! Every record goes through the same form validation as the admin modals.
//! The whole file is checked before the first request is sent, so a typo in
//! the last product never leaves a half-seeded backend behind.
//!
//! ```yaml
//! users:
//!   - name: Ada Lovelace
//!     email: ada@example.com
//!     password: analytical
//! products:
//!   - name: Desk lamp
//!     description: Warm white LED
//!     price: "39.90"
//!     category: lighting
//!     tags: [desk, led]
//!     in_stock: true
//! ```

use std::fmt::Debug;
use std::path::Path;

use serde::Deserialize;
use tracing::{error, info};

use backoffice_admin::backend::{ProductPayload, UserCreate};
use backoffice_admin::forms::{
    FieldErrors, ProductField, ProductForm, ProductSubmission, UserField, UserForm, UserSubmission,
};

/// Contents of a seed file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeedFile {
    pub users: Vec<SeedUser>,
    pub products: Vec<SeedProduct>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedProduct {
    pub name: String,
    pub description: String,
    /// Decimal text; quote it in YAML so it is not read as a float.
    pub price: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
}

const fn default_in_stock() -> bool {
    true
}

/// Validated payloads, in file order.
#[derive(Debug, Default)]
pub struct SeedPlan {
    pub users: Vec<UserCreate>,
    pub products: Vec<ProductPayload>,
}

impl SeedFile {
    /// Run every record through its form.
    ///
    /// # Errors
    ///
    /// Returns one message per failing field across the whole file.
    pub fn plan(&self) -> Result<SeedPlan, Vec<String>> {
        let mut plan = SeedPlan::default();
        let mut problems = Vec::new();

        for (index, user) in self.users.iter().enumerate() {
            let mut form = UserForm::new();
            form.set(UserField::Name, user.name.as_str());
            form.set(UserField::Email, user.email.as_str());
            form.set(UserField::Password, user.password.as_str());

            match form.validate() {
                Ok(UserSubmission::Create(payload)) => plan.users.push(payload),
                Ok(UserSubmission::Update(..)) => {
                    problems.push(format!("users[{index}]: resolved to an update"));
                }
                Err(errors) => problems.extend(describe("users", index, &errors)),
            }
        }

        for (index, product) in self.products.iter().enumerate() {
            let mut form = ProductForm::new();
            form.set(ProductField::Name, product.name.as_str());
            form.set(ProductField::Description, product.description.as_str());
            form.set(ProductField::Price, product.price.as_str());
            form.set(ProductField::Category, product.category.as_str());
            form.set(ProductField::Tags, product.tags.join(", "));
            form.set_in_stock(product.in_stock);

            match form.validate() {
                Ok(ProductSubmission::Create(payload)) => plan.products.push(payload),
                Ok(ProductSubmission::Update(..)) => {
                    problems.push(format!("products[{index}]: resolved to an update"));
                }
                Err(errors) => problems.extend(describe("products", index, &errors)),
            }
        }

        if problems.is_empty() {
            Ok(plan)
        } else {
            Err(problems)
        }
    }
}

fn describe<F: Ord + Copy + Debug>(
    section: &str,
    index: usize,
    errors: &FieldErrors<F>,
) -> Vec<String> {
    errors
        .fields()
        .filter_map(|field| {
            errors.message(field).map(|message| {
                let name = format!("{field:?}").to_lowercase();
                format!("{section}[{index}].{name}: {message}")
            })
        })
        .collect()
}

/// Seed users and products from a YAML file.
///
/// # Arguments
///
/// * `file_path` - Path to the YAML seed file
/// * `backend_url` - Backend base URL; `BACKEND_URL` is used when absent
/// * `dry_run` - Validate only, never contact the backend
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, if any record is
/// invalid, or if the backend rejects a request. Records created before a
/// backend failure stay created.
pub async fn from_file(
    file_path: &str,
    backend_url: Option<&str>,
    dry_run: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading seed file");

    let content = tokio::fs::read_to_string(path).await?;
    let file: SeedFile = serde_yaml::from_str(&content)?;

    let plan = match file.plan() {
        Ok(plan) => plan,
        Err(problems) => {
            error!("Seed file validation failed:");
            for problem in &problems {
                error!("  - {problem}");
            }
            return Err(format!("{} validation errors found", problems.len()).into());
        }
    };

    info!(
        users = plan.users.len(),
        products = plan.products.len(),
        "Seed file validated"
    );

    if dry_run {
        info!("Dry run, nothing sent");
        return Ok(());
    }

    let client = super::backend_client(backend_url)?;

    for payload in &plan.users {
        let user = client.users().create(payload).await?;
        info!(id = %user.id, email = %user.email, "Created user");
    }

    for payload in &plan.products {
        let product = client.products().create(payload).await?;
        info!(id = %product.id, name = %product.name, "Created product");
    }

    info!("Seeding complete!");
    info!("  Users created: {}", plan.users.len());
    info!("  Products created: {}", plan.products.len());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> SeedFile {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_valid_file_produces_payloads() {
        let file = parse(
            r#"
users:
  - name: Ada Lovelace
    email: ada@example.com
    password: analytical
products:
  - name: Desk lamp
    description: Warm white LED
    price: "39.90"
    category: lighting
    tags: [desk, " led "]
"#,
        );

        let plan = file.plan().unwrap();
        assert_eq!(plan.users.len(), 1);
        assert_eq!(plan.users[0].email.as_str(), "ada@example.com");
        assert_eq!(plan.products.len(), 1);
        assert_eq!(plan.products[0].tags.to_string(), "desk, led");
        assert!(plan.products[0].in_stock);
    }

    #[test]
    fn test_every_problem_is_reported() {
        let file = parse(
            r#"
users:
  - name: ""
    email: not-an-email
    password: secret
products:
  - name: Lamp
    description: Bright
    price: "-1"
    category: lighting
"#,
        );

        let problems = file.plan().unwrap_err();
        assert_eq!(problems.len(), 3);
        assert!(problems[0].starts_with("users[0].name:"));
        assert!(problems[1].starts_with("users[0].email:"));
        assert!(problems[2].starts_with("products[0].price:"));
    }

    #[test]
    fn test_missing_password_is_rejected() {
        let file = parse(
            r#"
users:
  - name: Ada
    email: ada@example.com
    password: "   "
"#,
        );

        let problems = file.plan().unwrap_err();
        assert_eq!(problems, vec!["users[0].password: This field is required"]);
    }

    #[test]
    fn test_empty_file_is_an_empty_plan() {
        let plan = parse("{}").plan().unwrap();
        assert!(plan.users.is_empty());
        assert!(plan.products.is_empty());
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let result: Result<SeedFile, _> = serde_yaml::from_str("customers: []");
        assert!(result.is_err());
    }
}
