//! Command Executor: one deterministic action per matched category.
//!
//! The executor performs the platform side effects itself (opening URLs,
//! showing text, applying the theme) and returns an [`Outcome`] describing
//! what should be spoken. Speaking is left to the caller, which threads the
//! vocalization decision through `should_speak`.
//!
//! Failures never escape: calculation errors, missing parameters and
//! unavailable collaborators all become a local advisory.

use rand::seq::SliceRandom;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use super::{CommandCategory, HELP_PHRASES, calc, clock};
use crate::config::{CompletionConfig, DispatchConfig};
use crate::history::HistoryStore;
use crate::llm::vision::{
    DOCUMENT_HISTORY_LABEL, IDENTIFY_HISTORY_LABEL, extract_document_text, identify_objects,
};
use crate::llm::{CompletionService, RequestOptions};
use crate::platform::{Camera, HostOs, Platform, Theme};
use crate::session::Session;
use crate::speech::{self, SpeechOutput, portuguese_voices};
use crate::storage::{LocalStore, THEME_KEY};
use crate::web::WebLookup;

const JOKES: &[&str] = &[
    "Por que o pinheiro não se perde na floresta? Porque ele tem uma pinha GPS!",
    "O que o pagodeiro foi fazer na igreja? Cantar Pá God!",
    "Por que o jacaré tirou o filho da escola? Porque ele réptil de ano!",
    "Qual é o contrário de papelada? Pá vestida!",
    "Por que o vampiro foi ao ortodontista? Porque seus caninos estavam tortos!",
    "O que o zero disse para o oito? Belo cinto!",
    "Por que a plantinha não foi ao médico? Porque ela estava de folga!",
];

const WEATHER_URL: &str = "https://weather.com/pt-BR/clima/hoje/l/-23.55,-46.64";
const CALC_FAILED_SPOKEN: &str =
    "Desculpe, não consegui realizar esse cálculo. Por favor, tente uma expressão mais simples.";
const CALC_FAILED_DISPLAY: &str =
    "Erro no cálculo. Tente algo como: 2 mais 2, 10 vezes 5, raiz quadrada de 16";
const MISSING_PARAMETER: &str = "Não entendi o termo do comando. Tente novamente.";
const VISION_UNAVAILABLE_SPOKEN: &str = "Serviços de câmera ou IA não disponíveis";
const VISION_UNAVAILABLE_DISPLAY: &str =
    "⚠️ Serviços de câmera ou IA não disponíveis. Verifique a configuração.";
const NO_CAMERA_SPOKEN: &str = "Câmera não encontrada no dispositivo";
const NO_CAMERA_DISPLAY: &str = "⚠️ Nenhuma câmera encontrada no dispositivo.";
const WEB_UNAVAILABLE: &str = "Serviço de busca na web não disponível";
const HISTORY_PREVIEW: usize = 5;
const HISTORY_PREVIEW_CHARS: usize = 50;

/// Result of executing one command. Every outcome counts as handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Category that ran.
    pub category: CommandCategory,
    /// Text shown to the user, if any.
    pub display: Option<String>,
    /// Text to speak, if any.
    pub speech: Option<String>,
    /// Whether the caller should speak `speech`.
    pub vocalize: bool,
}

impl Outcome {
    fn new(category: CommandCategory) -> Self {
        Self {
            category,
            display: None,
            speech: None,
            vocalize: false,
        }
    }

    /// Speak and show the same text.
    fn announce(self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.say(text.clone()).show(text)
    }

    fn say(mut self, text: impl Into<String>) -> Self {
        self.speech = Some(text.into());
        self
    }

    fn show(mut self, text: impl Into<String>) -> Self {
        self.display = Some(text.into());
        self
    }
}

/// Runs matched commands against the platform collaborators.
pub struct CommandExecutor {
    platform: Arc<dyn Platform>,
    speech: Arc<dyn SpeechOutput>,
    store: Arc<LocalStore>,
    history: Arc<HistoryStore>,
    session: Arc<Session>,
    web: Option<Arc<dyn WebLookup>>,
    camera: Option<Arc<dyn Camera>>,
    vision: Option<Arc<dyn CompletionService>>,
    completion: CompletionConfig,
    dispatch: DispatchConfig,
    stopwatch: Mutex<Option<Instant>>,
}

impl CommandExecutor {
    /// Executor over the required collaborators. Web lookup, camera and the
    /// vision service are optional and attached with the `with_*` methods.
    pub fn new(
        platform: Arc<dyn Platform>,
        speech: Arc<dyn SpeechOutput>,
        store: Arc<LocalStore>,
        session: Arc<Session>,
    ) -> Self {
        Self {
            platform,
            speech,
            history: Arc::new(HistoryStore::new(Arc::clone(&store))),
            store,
            session,
            web: None,
            camera: None,
            vision: None,
            completion: CompletionConfig::default(),
            dispatch: DispatchConfig::default(),
            stopwatch: Mutex::new(None),
        }
    }

    pub fn with_web(mut self, web: Arc<dyn WebLookup>) -> Self {
        self.web = Some(web);
        self
    }

    pub fn with_camera(mut self, camera: Arc<dyn Camera>) -> Self {
        self.camera = Some(camera);
        self
    }

    /// Vision-capable completion service used by the camera commands.
    pub fn with_vision(mut self, service: Arc<dyn CompletionService>) -> Self {
        self.vision = Some(service);
        self
    }

    pub fn with_completion_config(mut self, config: CompletionConfig) -> Self {
        self.completion = config;
        self
    }

    pub fn with_dispatch_config(mut self, config: DispatchConfig) -> Self {
        self.dispatch = config;
        self
    }

    /// Conversation history shared with the completion path.
    pub fn history(&self) -> &Arc<HistoryStore> {
        &self.history
    }

    /// Run `category` with its extracted `parameter`.
    pub async fn execute(
        &self,
        category: CommandCategory,
        parameter: Option<&str>,
        should_speak: bool,
    ) -> Outcome {
        tracing::debug!(%category, has_parameter = parameter.is_some(), "executing command");
        let parameter = parameter.map(str::trim).filter(|p| !p.is_empty());
        let outcome = Outcome::new(category);

        let mut outcome = match category {
            CommandCategory::Help => outcome
                .say("Aqui estão os comandos disponíveis")
                .show(format!("Comandos disponíveis:\n{}", HELP_PHRASES.join("\n"))),
            CommandCategory::OpenYouTube => {
                self.open(outcome, "https://www.youtube.com", "Abrindo YouTube")
            }
            CommandCategory::OpenGoogle => {
                self.open(outcome, "https://www.google.com", "Abrindo Google")
            }
            CommandCategory::OpenLinkedIn => {
                self.open(outcome, "https://www.linkedin.com", "Abrindo LinkedIn")
            }
            CommandCategory::OpenFacebook => {
                self.open(outcome, "https://www.facebook.com", "Abrindo Facebook")
            }
            CommandCategory::OpenInstagram => {
                self.open(outcome, "https://www.instagram.com", "Abrindo Instagram")
            }
            CommandCategory::OpenTwitter => {
                self.open(outcome, "https://www.twitter.com", "Abrindo Twitter")
            }
            CommandCategory::SearchGoogle => match parameter {
                Some(term) => self.open(
                    outcome,
                    &format!(
                        "https://www.google.com/search?q={}",
                        urlencoding::encode(term)
                    ),
                    &format!("Pesquisando no Google: {term}"),
                ),
                None => outcome.announce(MISSING_PARAMETER),
            },
            CommandCategory::SearchWikipedia => match parameter {
                Some(term) => self.open(
                    outcome,
                    &format!("https://pt.wikipedia.org/wiki/{}", urlencoding::encode(term)),
                    &format!("Pesquisando na Wikipedia: {term}"),
                ),
                None => outcome.announce(MISSING_PARAMETER),
            },
            CommandCategory::Time => {
                outcome.announce(format!("São exatamente {}", clock::now_time()))
            }
            CommandCategory::Date => outcome.announce(format!("Hoje é {}", clock::today())),
            CommandCategory::Music => self.open(
                outcome,
                "https://music.youtube.com",
                "Tocando sua playlist favorita no YouTube Music",
            ),
            CommandCategory::Weather => {
                self.open(outcome, WEATHER_URL, "Abrindo previsão do tempo")
            }
            CommandCategory::Joke => {
                let joke = JOKES
                    .choose(&mut rand::thread_rng())
                    .copied()
                    .unwrap_or(JOKES[0]);
                outcome.announce(joke)
            }
            CommandCategory::DarkMode => self.set_theme(outcome, Theme::Dark),
            CommandCategory::LightMode => self.set_theme(outcome, Theme::Light),
            CommandCategory::Calculate => Self::calculate(outcome, parameter),
            CommandCategory::Timer => self.stopwatch(outcome),
            CommandCategory::Translate => match parameter {
                Some(text) => self.open(
                    outcome,
                    &format!(
                        "https://translate.google.com/?sl=auto&tl=en&text={}",
                        urlencoding::encode(text)
                    ),
                    "Abrindo tradutor",
                ),
                None => outcome.announce(MISSING_PARAMETER),
            },
            CommandCategory::Reminder => match parameter {
                Some(message) => self.schedule_reminder(outcome, message),
                None => outcome.announce(MISSING_PARAMETER),
            },
            CommandCategory::VolumeUp => outcome.announce("Volume aumentado"),
            CommandCategory::VolumeDown => outcome.announce("Volume diminuído"),
            CommandCategory::ListVoices => self.list_voices(outcome),
            CommandCategory::ChangeVoice => self.change_voice(outcome),
            CommandCategory::OpenCalculator
            | CommandCategory::OpenNotepad
            | CommandCategory::OpenSettings => self.open_app(outcome),
            CommandCategory::Camera | CommandCategory::ReadDocument => {
                self.camera_task(outcome).await
            }
            CommandCategory::ClearHistory => match self.history.clear() {
                Ok(()) => outcome
                    .say("Histórico limpo")
                    .show("Histórico limpo com sucesso"),
                Err(e) => {
                    tracing::warn!(error = %e, "failed to clear history");
                    outcome.announce("Não foi possível limpar o histórico")
                }
            },
            CommandCategory::ShowHistory => self.show_history(outcome),
            CommandCategory::WebSearch => match parameter {
                Some(query) => self.web_search(outcome, query).await,
                None if self.web.is_none() => outcome.announce(WEB_UNAVAILABLE),
                None => outcome.announce(MISSING_PARAMETER),
            },
        };

        if let Some(text) = &outcome.display {
            self.platform.display(text);
        }
        outcome.vocalize = should_speak && outcome.speech.is_some();
        outcome
    }

    fn open(&self, outcome: Outcome, url: &str, message: &str) -> Outcome {
        self.platform.open_url(url);
        outcome.announce(message)
    }

    fn set_theme(&self, outcome: Outcome, theme: Theme) -> Outcome {
        self.platform.apply_theme(theme);
        if let Err(e) = self.store.save(THEME_KEY, theme.name()) {
            tracing::warn!(error = %e, %theme, "failed to persist theme");
        }
        outcome.announce(format!("Modo {} ativado", theme.label()))
    }

    fn calculate(outcome: Outcome, parameter: Option<&str>) -> Outcome {
        match calc::calculate(parameter.unwrap_or_default()) {
            Ok(calculation) => {
                let value = calculation.formatted();
                outcome
                    .say(format!("O resultado é {value}"))
                    .show(format!("{} = {value}", calculation.expression))
            }
            Err(e) => {
                tracing::debug!(error = %e, "calculation failed");
                outcome.say(CALC_FAILED_SPOKEN).show(CALC_FAILED_DISPLAY)
            }
        }
    }

    fn stopwatch(&self, outcome: Outcome) -> Outcome {
        let previous = self
            .stopwatch
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .replace(Instant::now());
        match previous {
            Some(started) => outcome.say("Reiniciando cronômetro").show(format!(
                "Cronômetro reiniciado. Tempo anterior: {}",
                clock::format_elapsed(started.elapsed())
            )),
            None => outcome
                .say("Iniciando cronômetro")
                .show(format!("Cronômetro: {}", clock::format_elapsed(Duration::ZERO))),
        }
    }

    /// Elapsed time on the running stopwatch, if started.
    pub fn stopwatch_elapsed(&self) -> Option<Duration> {
        self.stopwatch
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .map(|started| started.elapsed())
    }

    fn schedule_reminder(&self, outcome: Outcome, message: &str) -> Outcome {
        let delay = Duration::from_secs(self.dispatch.reminder_delay_secs);
        let platform = Arc::clone(&self.platform);
        let output = Arc::clone(&self.speech);
        let session = Arc::clone(&self.session);
        let body = message.to_owned();

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tracing::debug!("reminder fired");
            if session.speak_enabled() {
                speech::say(output.as_ref(), &format!("Lembrete: {body}")).await;
            }
            platform.notify("Lembrete", &body);
        });

        outcome.announce(format!("Criando lembrete: {message}"))
    }

    fn list_voices(&self, outcome: Outcome) -> Outcome {
        let voices = portuguese_voices(&self.speech.voices());
        if voices.is_empty() {
            return outcome.announce("Não encontrei vozes em português");
        }
        let names = voices
            .iter()
            .map(|v| v.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        outcome
            .say(format!("Vozes disponíveis em português: {names}"))
            .show(format!("Vozes disponíveis: {names}"))
    }

    fn change_voice(&self, outcome: Outcome) -> Outcome {
        let voices = portuguese_voices(&self.speech.voices());
        let Some(voice) = voices.choose(&mut rand::thread_rng()).cloned() else {
            return outcome.announce("Não encontrei outras vozes em português");
        };
        self.speech.set_voice(&voice);
        outcome
            .say(format!("Trocando para a voz: {}", voice.name))
            .show(format!("Nova voz: {}", voice.name))
    }

    fn open_app(&self, outcome: Outcome) -> Outcome {
        let os = self.platform.host_os();
        let target = match (outcome.category, os) {
            (CommandCategory::OpenCalculator, HostOs::Windows) => {
                Ok(("calc://", "Abrindo calculadora do Windows"))
            }
            (CommandCategory::OpenCalculator, HostOs::MacOs) => {
                Ok(("calculator://", "Abrindo calculadora do macOS"))
            }
            (CommandCategory::OpenCalculator, _) => {
                Err("Em dispositivos móveis, por favor use a calculadora do seu sistema")
            }
            (CommandCategory::OpenNotepad, HostOs::Windows) => {
                Ok(("notepad://", "Abrindo bloco de notas do Windows"))
            }
            (CommandCategory::OpenNotepad, HostOs::MacOs) => {
                Ok(("textedit://", "Abrindo TextEdit do macOS"))
            }
            (CommandCategory::OpenNotepad, _) => {
                Err("Desculpe, não consigo abrir o editor de texto neste sistema operacional")
            }
            (_, HostOs::Windows) => Ok(("ms-settings://", "Abrindo configurações do Windows")),
            (_, HostOs::MacOs) => Ok((
                "x-apple.systempreferences://",
                "Abrindo preferências do sistema",
            )),
            _ => Err("Desculpe, não consigo abrir as configurações neste sistema operacional"),
        };

        match target {
            Ok((url, message)) => self.open(outcome, url, message),
            Err(advisory) => {
                tracing::debug!(?os, "no app handler for host");
                outcome.announce(advisory)
            }
        }
    }

    async fn camera_task(&self, outcome: Outcome) -> Outcome {
        let (Some(camera), Some(vision)) = (&self.camera, &self.vision) else {
            return outcome
                .say(VISION_UNAVAILABLE_SPOKEN)
                .show(VISION_UNAVAILABLE_DISPLAY);
        };
        if !camera.is_available().await {
            return outcome.say(NO_CAMERA_SPOKEN).show(NO_CAMERA_DISPLAY);
        }

        let jpeg = match camera.capture_jpeg().await {
            Ok(jpeg) => jpeg,
            Err(e) => {
                tracing::warn!(error = %e, "camera capture failed");
                return outcome.announce("Não foi possível capturar a imagem");
            }
        };

        let document = outcome.category == CommandCategory::ReadDocument;
        let result = if document {
            let options = RequestOptions::document(&self.completion);
            extract_document_text(vision.as_ref(), &options, &jpeg).await
        } else {
            let options = RequestOptions::vision(&self.completion);
            identify_objects(vision.as_ref(), &options, &jpeg).await
        };

        match result {
            Ok(text) => {
                let label = if document {
                    DOCUMENT_HISTORY_LABEL
                } else {
                    IDENTIFY_HISTORY_LABEL
                };
                if let Err(e) = self.history.add(label, text.clone()) {
                    tracing::warn!(error = %e, "failed to record vision result");
                }
                self.platform.display_rich(&text);
                outcome.say(text)
            }
            Err(e) => {
                tracing::warn!(error = %e, document, "vision request failed");
                outcome.say(e.spoken_summary()).show(e.user_message())
            }
        }
    }

    fn show_history(&self, outcome: Outcome) -> Outcome {
        let entries = self.history.all();
        if entries.is_empty() {
            return outcome
                .say("Não há histórico de conversas")
                .show("Nenhuma conversa no histórico");
        }

        let listing = entries
            .iter()
            .take(HISTORY_PREVIEW)
            .enumerate()
            .map(|(i, entry)| {
                let preview: String = entry.assistant.chars().take(HISTORY_PREVIEW_CHARS).collect();
                format!("{}. Você: {}\n   Cangalha: {preview}...", i + 1, entry.user)
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        outcome
            .say(format!(
                "Você tem {} conversas no histórico. Mostrando as {HISTORY_PREVIEW} mais recentes.",
                entries.len()
            ))
            .show(format!("Histórico ({} conversas):\n\n{listing}", entries.len()))
    }

    async fn web_search(&self, outcome: Outcome, query: &str) -> Outcome {
        let Some(web) = &self.web else {
            return outcome.announce(WEB_UNAVAILABLE);
        };
        self.platform.display("Buscando informações na web...");

        match web.search_web(query).await {
            Some(results) => {
                self.platform.display_rich(&results);
                outcome.say(format!("Encontrei informações sobre {query}"))
            }
            None => outcome.say("Não encontrei informações atualizadas").show(format!(
                "Não encontrei informações atualizadas sobre \"{query}\". Tente reformular sua busca \
                 ou use o comando \"pesquisar no google [termo]\" para abrir o Google."
            )),
        }
    }
}
