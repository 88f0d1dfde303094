use clap::Args;
use lealtad::billing::{BillingPlan, PlanCode};
use tabled::{builder::Builder, settings::Style};

#[derive(Debug, Args)]
pub(crate) struct PlansArgs {
    /// Print a single plan as JSON instead of the catalog table
    #[arg(long)]
    plan: Option<PlanCode>,
}

pub(crate) fn run(args: &PlansArgs) -> Result<(), String> {
    if let Some(code) = args.plan {
        let json = serde_json::to_string_pretty(&BillingPlan::for_code(code))
            .map_err(|error| format!("failed to encode plan: {error}"))?;

        println!("{json}");

        return Ok(());
    }

    println!("{}", catalog_table());

    Ok(())
}

fn catalog_table() -> String {
    let mut builder = Builder::default();

    builder.push_record([
        "plan",
        "program types",
        "staff seats",
        "campaigns",
        "recipients/month",
        "csv export",
        "analytics",
    ]
    .map(String::from));

    for plan in BillingPlan::catalog() {
        builder.push_record([
            plan.code.to_string(),
            plan.max_program_types.to_string(),
            plan.max_staff_seats.to_string(),
            plan.max_scheduled_campaigns.to_string(),
            plan.max_monthly_recipients.to_string(),
            yes_no(plan.csv_export).to_string(),
            yes_no(plan.advanced_analytics).to_string(),
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());

    table.to_string()
}

const fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
