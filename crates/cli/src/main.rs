use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use clinic_client::{AppointmentClient, ClientConfig, ClientError};
use clinic_core::{
    derive_end_time, pb, validate, AppointmentForm, AppointmentStatus, FieldErrors, TimeOfDay,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "clinic")]
#[command(about = "Clinic appointment booking CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Booking form fields shared by `validate` and `book`.
#[derive(clap::Args)]
struct FormArgs {
    /// Patient ID
    #[arg(long)]
    patient: String,
    /// Doctor ID
    #[arg(long)]
    doctor: String,
    /// Appointment date (YYYY-MM-DD)
    #[arg(long)]
    date: String,
    /// Start time (HH:MM)
    #[arg(long)]
    start: String,
    /// End time (HH:MM); overrides any end time derived from the service
    #[arg(long)]
    end: Option<String>,
    /// Free-text notes
    #[arg(long, default_value = "")]
    notes: String,
    /// Initial status (SCHEDULED or CONFIRMED)
    #[arg(long, default_value = "SCHEDULED")]
    status: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the end time for a start time and duration
    EndTime {
        /// Start time (HH:MM)
        start: String,
        /// Duration in minutes
        duration: u32,
    },
    /// Check booking fields without contacting the API
    Validate {
        #[command(flatten)]
        form: FormArgs,
    },
    /// Book an appointment
    Book {
        #[command(flatten)]
        form: FormArgs,
        /// Service ID; its duration sets the end time
        #[arg(long)]
        service: Option<String>,
    },
    /// Confirm a scheduled appointment
    Confirm { id: String },
    /// Mark an appointment as completed
    Complete { id: String },
    /// Cancel an appointment
    Cancel { id: String },
    /// Mark an appointment as a no-show
    NoShow { id: String },
    /// List appointments
    Appointments {
        /// Only show appointments in this status (e.g. CONFIRMED)
        #[arg(long)]
        status: Option<AppointmentStatus>,
    },
    /// List patients
    Patients,
    /// List staff
    Staff,
    /// List services
    Services,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("clinic_client=warn".parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("No command given. Run `clinic --help` for usage.");
        return Ok(());
    };

    match command {
        Commands::EndTime { start, duration } => {
            let start = TimeOfDay::parse(&start)?;
            let derived = derive_end_time(start, duration);
            if derived.crosses_midnight {
                println!("{} (next day)", derived.end);
            } else {
                println!("{}", derived.end);
            }
        }
        Commands::Validate { form } => {
            let form = build_form(form, None);
            match validate(&form) {
                Ok(_) => println!("valid"),
                Err(errors) => {
                    print_field_errors(&errors);
                    bail!("{} field(s) invalid", errors.len());
                }
            }
        }
        Commands::Book { form: args, service } => {
            let client = client()?;
            let service = match service {
                Some(id) => Some(
                    client
                        .list_services()
                        .await?
                        .into_iter()
                        .find(|s| s.id == id)
                        .with_context(|| format!("unknown service: {id}"))?,
                ),
                None => None,
            };

            let mut form = build_form(args, service.as_ref());
            let result = client
                .submit(&mut form, |record| {
                    println!("Booked appointment {}", record.id);
                })
                .await;
            match result {
                Ok(record) => print_appointment(&record),
                Err(ClientError::Validation(errors)) => {
                    print_field_errors(&errors);
                    bail!("appointment not submitted");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Commands::Confirm { id } => change_status(&id, AppointmentStatus::Confirmed).await?,
        Commands::Complete { id } => change_status(&id, AppointmentStatus::Completed).await?,
        Commands::Cancel { id } => change_status(&id, AppointmentStatus::Cancelled).await?,
        Commands::NoShow { id } => change_status(&id, AppointmentStatus::NoShow).await?,
        Commands::Appointments { status } => {
            let appointments = client()?.list_appointments(status).await?;
            if appointments.is_empty() {
                println!("No appointments found.");
            }
            for appointment in &appointments {
                print_appointment(appointment);
            }
        }
        Commands::Patients => {
            let patients = client()?.list_patients().await?;
            if patients.is_empty() {
                println!("No patients found.");
            }
            for patient in patients {
                println!(
                    "ID: {}, Name: {} {}",
                    patient.id, patient.first_name, patient.last_name
                );
            }
        }
        Commands::Staff => {
            for member in client()?.list_staff().await? {
                println!("ID: {}, Name: {}, Role: {:?}", member.id, member.name, member.role);
            }
        }
        Commands::Services => {
            for service in client()?.list_services().await? {
                println!(
                    "ID: {}, Name: {}, Duration: {} min, Price: {:.2}",
                    service.id, service.name, service.duration_minutes, service.price
                );
            }
        }
    }

    Ok(())
}

fn client() -> anyhow::Result<AppointmentClient> {
    let config = ClientConfig::from_env_values(
        std::env::var("CLINIC_API_URL").ok(),
        std::env::var("CLINIC_HTTP_TIMEOUT_SECS").ok(),
        std::env::var("CLINIC_UTC_OFFSET").ok(),
    )?;
    Ok(AppointmentClient::new(&config)?)
}

fn build_form(args: FormArgs, service: Option<&pb::Service>) -> AppointmentForm {
    let mut form = AppointmentForm::new();
    form.patient_id = args.patient;
    form.doctor_id = args.doctor;
    form.date = args.date;
    form.notes = args.notes;
    form.status = args.status;
    if let Some(service) = service {
        form.select(service);
    }
    form.set_start_time(args.start);
    if let Some(end) = args.end {
        form.set_end_time(end);
    }
    form
}

async fn change_status(id: &str, next: AppointmentStatus) -> anyhow::Result<()> {
    let client = client()?;
    let record = client.get_appointment(id).await?;
    let updated = client.transition(&record, next).await?;
    println!("Appointment {} is now {}", updated.id, updated.status);
    Ok(())
}

fn print_field_errors(errors: &FieldErrors) {
    for (field, message) in errors.iter() {
        eprintln!("{}: {}", field, message);
    }
}

fn print_appointment(appointment: &pb::AppointmentRes) {
    println!(
        "ID: {}, Patient: {}, Doctor: {}, {} - {}, Status: {}",
        appointment.id,
        appointment.patient_id,
        appointment.doctor_id,
        appointment.start_time.format("%Y-%m-%d %H:%M"),
        appointment.end_time.format("%H:%M"),
        appointment.status
    );
}
