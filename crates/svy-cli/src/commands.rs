//! Command implementations.

use anyhow::{Context, Result};
use tracing::debug;

use svy_ingest::SurveyDataset;
use svy_model::{CodedVariable, VariableRegistry, schema};
use svy_stats::{
    RefusedPolicy, association_test, format_p_value, weighted_crosstab, weighted_distribution,
    weighted_proportion_ci,
};

use crate::cli::{
    BatteryArgs, CiArgs, CrosstabArgs, DataArgs, DistributionArgs, SchemaArgs, TestArgs,
};
use crate::summary::{
    battery_table, ci_table, crosstab_table, distribution_table, print_association,
    print_overview, print_variables, scan_table,
};
use crate::types::ScanRow;

fn load_registry(args: &SchemaArgs) -> Result<VariableRegistry> {
    match &args.schema {
        Some(path) => {
            schema::load(path).with_context(|| format!("load schema {}", path.display()))
        }
        None => schema::builtin().context("load builtin schema"),
    }
}

fn load_dataset(args: &DataArgs, registry: &VariableRegistry) -> Result<SurveyDataset> {
    SurveyDataset::load(&args.data, registry)
        .with_context(|| format!("load dataset {}", args.data.display()))
}

/// Extract one variable's codes plus the canonical weights.
fn extract(
    dataset: &SurveyDataset,
    variable: &CodedVariable,
) -> Result<(Vec<Option<i64>>, Vec<Option<f64>>)> {
    let values = dataset
        .coded_values(&variable.name)
        .with_context(|| format!("extract column {}", variable.name))?;
    let weights = dataset.weights().context("extract weights")?;
    Ok((values, weights))
}

pub fn run_variables(args: &SchemaArgs) -> Result<()> {
    let registry = load_registry(args)?;
    print_variables(&registry);
    Ok(())
}

pub fn run_overview(args: &DataArgs) -> Result<()> {
    let registry = load_registry(&args.schema)?;
    let dataset = load_dataset(args, &registry)?;
    let overview = dataset.overview().context("compute overview")?;
    print_overview(registry.survey(), &overview);
    for name in registry.profile() {
        let variable = registry.variable(name)?;
        let (values, weights) = extract(&dataset, variable)?;
        let shares = weighted_distribution(&values, &weights, variable, RefusedPolicy::Exclude)?;
        println!();
        println!("{}", variable.label);
        println!("{}", distribution_table(&shares));
    }
    Ok(())
}

pub fn run_distribution(args: &DistributionArgs) -> Result<()> {
    let registry = load_registry(&args.data.schema)?;
    let variable = registry.resolve(&args.variable)?;
    let dataset = load_dataset(&args.data, &registry)?;
    let (values, weights) = extract(&dataset, &variable)?;
    let policy = if args.include_refused {
        RefusedPolicy::Include
    } else {
        RefusedPolicy::Exclude
    };
    let shares = weighted_distribution(&values, &weights, &variable, policy)?;
    println!("{}", variable.label);
    println!("{}", distribution_table(&shares));
    Ok(())
}

pub fn run_battery(args: &BatteryArgs) -> Result<()> {
    let registry = load_registry(&args.data.schema)?;
    let battery = registry.battery(&args.key)?;
    let dataset = load_dataset(&args.data, &registry)?;
    let weights = dataset.weights().context("extract weights")?;
    let mut rows = Vec::new();
    for variable in battery.item_variables() {
        let values = dataset
            .coded_values(&variable.name)
            .with_context(|| format!("extract column {}", variable.name))?;
        let shares = weighted_distribution(&values, &weights, &variable, RefusedPolicy::Exclude)?;
        rows.push((variable.label.clone(), shares));
    }
    println!("{}", battery.title);
    println!("{}", battery_table(battery, &rows));
    Ok(())
}

pub fn run_crosstab(args: &CrosstabArgs) -> Result<()> {
    let registry = load_registry(&args.data.schema)?;
    let question = registry.resolve(&args.question)?;
    let demographic = registry.resolve(&args.demographic)?;
    let dataset = load_dataset(&args.data, &registry)?;
    let q_values = dataset
        .coded_values(&question.name)
        .with_context(|| format!("extract column {}", question.name))?;
    let demo_values = dataset
        .coded_values(&demographic.name)
        .with_context(|| format!("extract column {}", demographic.name))?;
    let weights = dataset.weights().context("extract weights")?;
    let cells = weighted_crosstab(&q_values, &demo_values, &weights, &question, &demographic)?;
    println!("{} × {}", question.label, demographic.label);
    println!("{}", crosstab_table(&cells));
    Ok(())
}

pub fn run_test(args: &TestArgs) -> Result<()> {
    let registry = load_registry(&args.data.schema)?;
    let question = registry.resolve(&args.question)?;
    let demographic = registry.resolve(&args.demographic)?;
    let dataset = load_dataset(&args.data, &registry)?;
    let q_values = dataset
        .coded_values(&question.name)
        .with_context(|| format!("extract column {}", question.name))?;
    let demo_values = dataset
        .coded_values(&demographic.name)
        .with_context(|| format!("extract column {}", demographic.name))?;
    match association_test(&q_values, &demo_values, &question, &demographic)? {
        Some(result) => print_association(&result, &question, &demographic, args.expected),
        None => println!("Not enough categories to perform a chi-square test."),
    }
    Ok(())
}

pub fn run_ci(args: &CiArgs) -> Result<()> {
    let registry = load_registry(&args.data.schema)?;
    let variable = registry.resolve(&args.variable)?;
    let dataset = load_dataset(&args.data, &registry)?;
    let (values, weights) = extract(&dataset, &variable)?;
    let result = weighted_proportion_ci(&values, &weights, &variable)?;
    println!("{}", variable.label);
    println!("{}", ci_table(&result));
    println!("Effective N: {:.0}", result.effective_n);
    Ok(())
}

pub fn run_scan(args: &DataArgs) -> Result<()> {
    let registry = load_registry(&args.schema)?;
    let dataset = load_dataset(args, &registry)?;
    let plan = registry.scan_plan();
    let mut rows = Vec::new();
    for question_name in &plan.questions {
        let question = registry.resolve(question_name)?;
        let q_values = dataset
            .coded_values(&question.name)
            .with_context(|| format!("extract column {}", question.name))?;
        for demographic_name in &plan.demographics {
            let demographic = registry.variable(demographic_name)?;
            let demo_values = dataset
                .coded_values(&demographic.name)
                .with_context(|| format!("extract column {}", demographic.name))?;
            let Some(result) =
                association_test(&q_values, &demo_values, &question, demographic)?
            else {
                debug!(
                    question = %question.name,
                    demographic = %demographic.name,
                    "skipping scan pair: insufficient categories"
                );
                continue;
            };
            rows.push(ScanRow {
                question: question.label.clone(),
                demographic: demographic.label.clone(),
                chi2: result.chi2,
                dof: result.dof,
                p_display: format_p_value(result.p_value),
                cramers_v: result.cramers_v,
                effect: result.effect,
                significance: result.significance,
            });
        }
    }
    if rows.is_empty() {
        println!("No testable question × demographic pairs in the scan plan.");
        return Ok(());
    }
    println!("Chi-square tests of independence (unweighted counts; illustrative).");
    println!("{}", scan_table(&rows));
    Ok(())
}
