//! Static scene catalog for the installation.
//!
//! Scenes are fixed at build time: the exhibit runs a scripted show, so
//! there is no scene CRUD anywhere in the system. The engine serves this
//! catalog over HTTP and uses it to validate inbound `scene_change` ids.

use serde::{Deserialize, Serialize};

/// A numbered phase of the exhibit with its triggerable phrases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    pub id: u32,
    pub name: String,
    pub description: String,
    pub phrases: Vec<String>,
}

/// Phrases played automatically in scene 1 once the manual sequence is done.
pub const SCENE1_AUTO_PHRASES: [&str; 8] = [
    "Hoy la misión es clara: motivar, inspirar y sumar confianza.",
    "¿Traje el cargador del celu? ¿Necesitaré adaptador?",
    "Respirá profundo: convención, allá vamos.",
    "Último repaso mental: todo bajo control.",
    "Ojalá que la energía positiva sea contagiosa.",
    "¿Estará mi perfume en el freeshop?",
    "Tengo que comprar garotos para todos en la oficina.",
    "Preparada, enfocada y con toda la energía lista.",
];

/// The full scene catalog, in show order.
pub fn scenes() -> Vec<Scene> {
    vec![
        Scene {
            id: 1,
            name: "Opening Thoughts".to_string(),
            description: "First 5 phrases - sequential remote trigger".to_string(),
            phrases: vec![
                "¿Y si me olvido de lo que tengo que decir?".to_string(),
                "Capaz no es suficiente lo que preparé...".to_string(),
                "¿Desenchufé la planchita de pelo?".to_string(),
                "¿Cómo hago para subirlos a todos al barco de Sistema Nervioso Central?"
                    .to_string(),
                "¿Por qué no me habré puesto zapatos más cómodos?".to_string(),
            ],
        },
        Scene {
            id: 2,
            name: "Start Scene".to_string(),
            description: "Start button to begin".to_string(),
            phrases: vec![],
        },
        Scene {
            id: 3,
            name: "Scene 3".to_string(),
            description: "3 individual phrase buttons".to_string(),
            phrases: vec![
                "Espero que Rocío no me pregunte nada difícil".to_string(),
                "Necesito ese micrófono… ¿estará en Mercado Libre?".to_string(),
                "Rocío… ¡te olvidaste de presentarme! Tenemos que anunciar mi nueva posición."
                    .to_string(),
            ],
        },
        Scene {
            id: 4,
            name: "Closing Scene".to_string(),
            description: "4 closing phrases - sequential trigger".to_string(),
            phrases: vec![
                "¡Sí! Juntos podemos, ¡vamos con todo!".to_string(),
                "¿Nos sacamos una foto todos juntos?".to_string(),
                "¡Lo vamos a lograr!".to_string(),
                "¡Qué bueno estar acá con todos!".to_string(),
            ],
        },
    ]
}

/// Whether `id` names a configured scene.
pub fn scene_exists(id: u32) -> bool {
    scenes().iter().any(|s| s.id == id)
}
